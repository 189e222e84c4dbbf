//! ゲームロジックモジュール
//!
//! コンポーネント定義、エンティティファクトリ、レベルデータ、
//! そしてワールドシミュレーション本体を含みます。

pub mod audio;
pub mod components;
pub mod elements;
pub mod entities;
pub mod level;
pub mod registry;
pub mod world;
