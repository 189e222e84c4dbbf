//! 2Dアクションゲームのシミュレーションコア
//!
//! このクレートは、エレメント属性を持つ2Dアクションゲームの
//! ゲームロジック部分を実装しています。固定のコンポーネントセットを持つ
//! 自作ECS、スウェプト衝突検出、エンティティペアごとの相互作用ルール、
//! タイマー駆動の状態遷移（無敵・死亡・レベルクリア）から構成されます。
//!
//! ウィンドウ管理・描画・音声再生・入力処理はこのクレートの範囲外で、
//! それぞれトレイト経由（`LevelSource` / `AudioSink`）または
//! コンポーネント状態の読み取り（描画側）で連携します。

// モジュール宣言
pub mod ecs;
pub mod game;
pub mod physics;
pub mod utils;

// 主要な型をエクスポート
pub use ecs::{Component, ComponentStore, Entity};
pub use game::registry::GameRegistry;
pub use game::world::WorldSim;
