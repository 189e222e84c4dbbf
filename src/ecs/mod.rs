//! Entity Component System (ECS)
//!
//! このモジュールはゲームのエンティティとコンポーネントを管理するための
//! ECSアーキテクチャを実装しています。
//!
//! ## 主要なコンポーネント:
//!
//! - `Entity`: ゲーム内のオブジェクトを表す一意のID
//! - `Component`: エンティティの特性や状態を表すデータ構造
//! - `ComponentStore`: 型ごとのコンポーネント格納庫
//!
//! コンポーネントの種類は固定で、実行時登録はサポートしません。
//! 新しいコンポーネント型は `GameRegistry` にストアを宣言することで追加します。

// マクロのリエクスポート
pub use ecs_derive::Component;

// モジュール宣言
pub mod component;
pub mod entity;

// 主要な構造体をエクスポート
pub use component::{Component, ComponentStore};
pub use entity::Entity;
