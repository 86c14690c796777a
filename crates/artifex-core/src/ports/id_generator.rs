//! IdGenerator port - ID 生成の抽象化
//!
//! テスト容易性のために trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: Clock の時刻 + ランダム部分で ULID を生成

use crate::domain::ids::{ArtifactId, ExecutionId, FileId, GroupId, Id};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator はレジストリが発行する ID を生成
pub trait IdGenerator: Send + Sync {
    fn next_ulid(&self) -> Ulid;

    fn execution_id(&self) -> ExecutionId {
        Id::from_ulid(self.next_ulid())
    }

    fn group_id(&self) -> GroupId {
        Id::from_ulid(self.next_ulid())
    }

    fn artifact_id(&self) -> ArtifactId {
        Id::from_ulid(self.next_ulid())
    }

    fn file_id(&self) -> FileId {
        Id::from_ulid(self.next_ulid())
    }
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// FixedClock を渡すとタイムスタンプ部分が固定されます（ランダム部分は異なる）。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.artifact_id();
        let id2 = id_gen.artifact_id();

        assert_ne!(id1, id2);
    }

    #[test]
    fn ulid_generator_with_fixed_clock_shares_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.group_id();
        let id2 = id_gen.group_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_ulid().timestamp_ms(), id2.as_ulid().timestamp_ms());
        assert_eq!(id1.as_ulid().timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }

    #[test]
    fn generated_ids_carry_their_prefix() {
        let id_gen = UlidGenerator::new(SystemClock);

        assert!(id_gen.execution_id().to_string().starts_with("exec-"));
        assert!(id_gen.group_id().to_string().starts_with("group-"));
        assert!(id_gen.artifact_id().to_string().starts_with("artifact-"));
        assert!(id_gen.file_id().to_string().starts_with("file-"));
    }
}
