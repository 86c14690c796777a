//! Domain identifiers (strongly-typed IDs).
//!
//! すべての ID は ULID ベースの `Id<T>` で表現します。
//! `T` は PhantomData のマーカー型で、実行時のコストはゼロですが、
//! `GroupId` と `ArtifactId` のような異なる ID をコンパイル時に区別できます。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: 定義順に並べ替えられる
//! - **調整不要で生成可能**: レジストリごとに独立して発行できる
//!
//! JSON 上ではプレフィックスなしの ULID 文字列としてシリアライズされます。
//! Display はプレフィックス付き（"group-01H..."）です。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"exec-", "group-", "artifact-", "file-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// プレフィックス付き・なしの両方を受け付けます。
impl<T: IdMarker> FromStr for Id<T> {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(T::prefix()).unwrap_or(s);
        Ulid::from_string(raw).map(Self::from_ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Execution のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Execution {}

impl IdMarker for Execution {
    fn prefix() -> &'static str {
        "exec-"
    }
}

/// ArtifactGroup のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {}

impl IdMarker for Group {
    fn prefix() -> &'static str {
        "group-"
    }
}

/// Artifact のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactMarker {}

impl IdMarker for ArtifactMarker {
    fn prefix() -> &'static str {
        "artifact-"
    }
}

/// ArtifactFile のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum File {}

impl IdMarker for File {
    fn prefix() -> &'static str {
        "file-"
    }
}

/// Identifier of one pipeline execution (the scope of all artifact identity).
pub type ExecutionId = Id<Execution>;

/// Identifier of an artifact group.
pub type GroupId = Id<Group>;

/// Identifier of an artifact.
pub type ArtifactId = Id<ArtifactMarker>;

/// Identifier of an artifact file binding.
pub type FileId = Id<File>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let ulid = Ulid::new();

        let group = GroupId::from_ulid(ulid);
        let artifact = ArtifactId::from_ulid(ulid);

        assert_eq!(group.as_ulid(), artifact.as_ulid());
        assert!(group.to_string().starts_with("group-"));
        assert!(artifact.to_string().starts_with("artifact-"));
        assert!(ExecutionId::from_ulid(ulid).to_string().starts_with("exec-"));
        assert!(FileId::from_ulid(ulid).to_string().starts_with("file-"));

        // let _: GroupId = artifact; // <- does not compile
    }

    #[test]
    fn ids_serialize_as_bare_ulid() {
        let ulid = Ulid::new();
        let id = ArtifactId::from_ulid(ulid);

        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, format!("\"{ulid}\""));

        let back: ArtifactId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn parse_accepts_prefixed_and_bare_forms() {
        let id = ExecutionId::from_ulid(Ulid::new());

        let prefixed: ExecutionId = id.to_string().parse().unwrap();
        let bare: ExecutionId = id.as_ulid().to_string().parse().unwrap();

        assert_eq!(prefixed, id);
        assert_eq!(bare, id);
        assert!("exec-not-a-ulid".parse::<ExecutionId>().is_err());
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<GroupId>(), size_of::<Ulid>());
        assert_eq!(size_of::<FileId>(), 16);
    }
}
