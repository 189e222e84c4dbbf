//! 物理モジュール
//!
//! 速度による位置の積分と、衝突判定対象エンティティ間の
//! 軸平行ボックス重なり検出を実装します。
//! 回転・質量・力積は扱いません（汎用物理エンジンではありません）。

pub mod collision;
pub mod dynamics;

pub use collision::{
    collided_bottom, collided_left, collided_right, collided_top, detect_collisions,
};
pub use dynamics::integrate;
