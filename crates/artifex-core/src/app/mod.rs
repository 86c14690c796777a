//! App - アプリケーション層
//!
//! ports を組み合わせてレジストリを組み立てます。
//!
//! # 主要コンポーネント
//! - **ArtifactRegistry**: 実行スコープの識別子レジストリ
//! - **RegistryBuilder**: レジストリの構築とワイヤリング
//! - **PipelineManifest**: 宣言的なパイプライン定義（JSON）

pub mod builder;
pub mod manifest;
pub mod registry;

pub use self::builder::RegistryBuilder;
pub use self::manifest::{
    ArtifactDecl, EmissionPlan, GroupRef, ManifestError, NodeDecl, OutputDecl, PipelineManifest,
};
pub use self::registry::{ArtifactRegistry, Phase};
