//! オーディオキューモジュール
//!
//! コアは離散イベントをfire-and-forgetで通知するだけで、
//! 実際の再生は外部コラボレータの責務です。再生の失敗が
//! シミュレーションの正しさに影響することはありません。

/// シミュレーションが発行する離散オーディオイベント
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    ProjectileFired,
    DamageTick,
    PlayerDeath,
    EnemyDeath,
    ObstacleHit,
    LevelEnd,
    PowerUpUnlocked,
    /// レベル開始時のボス戦イントロ
    BossIntro { final_boss: bool },
    /// ボスが初めて戦闘状態になったときのBGM切り替え
    BossBattleStart { final_boss: bool },
    /// ボス撃破後などの通常BGM復帰
    BackgroundMusic,
}

/// オーディオ通知先の契約
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// 何も再生しないシンク（テスト・ヘッドレス実行用）
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: AudioCue) {}
}
