//! ユーティリティモジュール

pub mod math;

pub use math::Vec2;
