//! ゲームコンポーネントモジュール
//!
//! シミュレーションで使用する固定のコンポーネントセットを定義します。
//! 新しいコンポーネント型は、ここに構造体を追加して `GameRegistry` に
//! ストアを宣言することで導入します（実行時登録はありません）。

use crate::ecs::{Component, Entity};
use crate::game::elements::ElementType;
use crate::utils::math::Vec2;

/// 位置コンポーネント
///
/// `prev_position` はスウェプト衝突判定のために直前の積分ステップ前の
/// 位置を保持します。`angle` は見た目の向きのみで、衝突判定には影響しません。
#[derive(Debug, Clone, Default, Component)]
pub struct Position {
    pub position: Vec2,
    pub prev_position: Vec2,
    /// 軸平行ボックスの全幅・全高（半エクステントはabs(scale)/2）
    pub scale: Vec2,
    pub angle: f32,
}

/// 速度コンポーネント（ゼロで静止）
#[derive(Debug, Clone, Default, Component)]
pub struct Velocity {
    pub velocity: Vec2,
}

/// 体力・マナコンポーネント
///
/// 体力バー・マナバーへの参照は所有関係ではなく逆参照です。
/// バーエンティティの寿命は独立に管理されるため、参照先の存在は
/// 必ず確認してから使用します。
#[derive(Debug, Clone, Component)]
pub struct Resources {
    pub current_health: f32,
    pub max_health: f32,
    pub current_mana: f32,
    pub max_mana: f32,
    pub health_bar: Option<Entity>,
    pub mana_bar: Option<Entity>,
    /// バー描画用の比率（描画側が読む）
    pub bar_ratio: f32,
    pub logo_ratio: f32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            current_health: 100.0,
            max_health: 100.0,
            current_mana: 10.0,
            max_mana: 10.0,
            health_bar: None,
            mana_bar: None,
            bar_ratio: 0.0,
            logo_ratio: 0.0,
        }
    }
}

impl Resources {
    /// 体力を[0, max]にクランプ
    pub fn clamp_health(&mut self) {
        self.current_health = self.current_health.clamp(0.0, self.max_health);
    }

    /// マナを[0, max]にクランプ
    pub fn clamp_mana(&mut self) {
        self.current_mana = self.current_mana.clamp(0.0, self.max_mana);
    }
}

/// 衝突判定に参加するマーカー
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct Collidable;

/// プレイヤーマーカー
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct Player;

/// 敵コンポーネント
#[derive(Debug, Clone, Component)]
pub struct Enemy {
    pub element: ElementType,
    pub damage: f32,
    /// 初回接触で立つワンショットラッチ（ボス戦BGMのキューに使う）
    pub is_aggravated: bool,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            element: ElementType::Water,
            damage: 10.0,
            is_aggravated: false,
        }
    }
}

/// ボスマーカー
///
/// 最終ボスはオーラ演出用のフォロワーエンティティを持ちます。
#[derive(Debug, Clone, Default, Component)]
pub struct Boss {
    pub aura: Option<Entity>,
}

/// 弾コンポーネント
#[derive(Debug, Clone, Component)]
pub struct Projectile {
    pub element: ElementType,
    /// 敵の弾ならtrue、プレイヤーの弾ならfalse
    pub hostile: bool,
    /// パワーアップで生成時にスケールされる
    pub damage: f32,
    /// 残り壁反射回数。尽きた後の地形接触で消滅する
    pub bounces: i32,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            element: ElementType::Water,
            hostile: false,
            damage: 20.0,
            bounces: 0,
        }
    }
}

/// 地形コンポーネント
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct Terrain {
    /// 可動地形はVelocityを持ち、壁接触で反射する
    pub moveable: bool,
}

/// 自由移動する即死ハザードのマーカー
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct Obstacle;

/// 床タイルのマーカー（衝突判定には参加しない）
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct Floor;

/// 出口ドアのマーカー
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct ExitDoor;

/// パワーアップの種類
///
/// 元実装はプレイヤー状態内のboolへの生ポインタで表現していましたが、
/// ここでは `PowerUp` へのキーとして表現します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    FasterMovement,
    IncreasedDamage(ElementType),
    TripleShot(ElementType),
    BounceOffWalls(ElementType),
}

impl PowerUpKind {
    /// パワーアップブロックに表示するラベル
    pub fn label(self) -> String {
        match self {
            PowerUpKind::FasterMovement => "Faster Movement Speed".to_string(),
            PowerUpKind::IncreasedDamage(e) => format!("Increase {} Damage", e.label()),
            PowerUpKind::TripleShot(e) => format!("Triple {} Shot", e.label()),
            PowerUpKind::BounceOffWalls(e) => format!("Bouncy {} Shot", e.label()),
        }
    }
}

/// プレイヤーが獲得したパワーアップの集合
///
/// ワールドリセットをまたいで持ち越されます（carry-over state）。
#[derive(Debug, Clone, Default, Component)]
pub struct PowerUp {
    pub faster_movement: bool,
    pub increased_damage: [bool; 4],
    pub triple_shot: [bool; 4],
    pub bounce_off_walls: [bool; 4],
}

impl PowerUp {
    /// 指定のパワーアップが有効かどうか
    pub fn is_enabled(&self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::FasterMovement => self.faster_movement,
            PowerUpKind::IncreasedDamage(e) => self.increased_damage[e.index()],
            PowerUpKind::TripleShot(e) => self.triple_shot[e.index()],
            PowerUpKind::BounceOffWalls(e) => self.bounce_off_walls[e.index()],
        }
    }

    /// 指定のパワーアップを設定
    pub fn set_enabled(&mut self, kind: PowerUpKind, enabled: bool) {
        match kind {
            PowerUpKind::FasterMovement => self.faster_movement = enabled,
            PowerUpKind::IncreasedDamage(e) => self.increased_damage[e.index()] = enabled,
            PowerUpKind::TripleShot(e) => self.triple_shot[e.index()] = enabled,
            PowerUpKind::BounceOffWalls(e) => self.bounce_off_walls[e.index()] = enabled,
        }
    }

    /// まだ獲得していないパワーアップの一覧
    pub fn available_kinds(&self) -> Vec<PowerUpKind> {
        let mut kinds = Vec::new();
        if !self.faster_movement {
            kinds.push(PowerUpKind::FasterMovement);
        }
        for element in ElementType::BASIC {
            if !self.increased_damage[element.index()] {
                kinds.push(PowerUpKind::IncreasedDamage(element));
            }
            if !self.triple_shot[element.index()] {
                kinds.push(PowerUpKind::TripleShot(element));
            }
            if !self.bounce_off_walls[element.index()] {
                kinds.push(PowerUpKind::BounceOffWalls(element));
            }
        }
        kinds
    }
}

/// パワーアップブロックコンポーネント
///
/// `text_entity` はブロックが有効なあいだだけ存在する通知テキストへの
/// 逆参照です。トグルの切り替えと同時に生成・破棄されます。
#[derive(Debug, Clone, Component)]
pub struct PowerUpBlock {
    pub label: String,
    pub kind: PowerUpKind,
    pub text_entity: Option<Entity>,
}

/// プレイヤーが選択中の弾エレメント
#[derive(Debug, Clone, Default, Component)]
pub struct CharacterProjectileType {
    pub element: ElementType,
}

/// フォロワーコンポーネント
///
/// 毎ティック、オーナー位置＋固定オフセットへ位置を強制されます。
/// 物理的な接続ではなく純粋な位置ミラーリングで、ドリフトは蓄積しません。
#[derive(Debug, Clone, Component)]
pub struct Follower {
    pub owner: Entity,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// フォロワーに追従するフォロワー（パワーアップインジケータ等）
#[derive(Debug, Clone, Component)]
pub struct SecondaryFollower {
    pub owner: Entity,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// 体力バーコンポーネント（ownerのResourcesを表示する）
#[derive(Debug, Clone, Component)]
pub struct HealthBar {
    pub owner: Entity,
}

/// マナバーコンポーネント
#[derive(Debug, Clone, Component)]
pub struct ManaBar {
    pub owner: Entity,
}

/// 画面上のテキストラベル
#[derive(Debug, Clone, Default, Component)]
pub struct Text {
    pub text: String,
    pub color: (f32, f32, f32),
}

/// 無敵タイマー（ミリ秒）。満了で削除されるだけで副作用はない
#[derive(Debug, Clone, Component)]
pub struct InvulnerableTimer {
    pub timer_ms: f32,
}

impl Default for InvulnerableTimer {
    fn default() -> Self {
        Self { timer_ms: 1000.0 }
    }
}

/// 死亡タイマー（ミリ秒）
///
/// カウント中は経過割合に応じて画面を暗転させ、満了で現在のレベルから
/// ワールドを再スタートします。
#[derive(Debug, Clone, Component)]
pub struct DeathTimer {
    pub timer_ms: f32,
}

impl DeathTimer {
    /// 満了までの全長（ミリ秒）
    pub const DURATION_MS: f32 = 3000.0;
}

impl Default for DeathTimer {
    fn default() -> Self {
        Self {
            timer_ms: Self::DURATION_MS,
        }
    }
}

/// レベルクリアタイマー（ミリ秒）
///
/// 正のあいだはスポットライト演出を駆動し、0でレベル遷移を一度だけ
/// 実行します。その後も閉幕演出のため負の領域までカウントを続けます。
#[derive(Debug, Clone, Component)]
pub struct WinTimer {
    pub timer_ms: f32,
    /// レベル遷移を一度だけ行うためのワンショットフラグ
    pub changed_level: bool,
}

impl WinTimer {
    /// スポットライト演出の全長（ミリ秒）
    pub const DURATION_MS: f32 = 3600.0;
    /// 遷移後、タイマーが削除されるまでの追加時間（ミリ秒）
    pub const LINGER_MS: f32 = 4000.0;
}

impl Default for WinTimer {
    fn default() -> Self {
        Self {
            timer_ms: Self::DURATION_MS,
            changed_level: false,
        }
    }
}

/// 画面演出の状態（描画側が毎ティック読む）
#[derive(Debug, Clone, Default, Component)]
pub struct ScreenState {
    /// 死亡タイマーの経過割合に比例した暗転係数 [0, 1]
    pub darken_screen_factor: f32,
    pub apply_spotlight: bool,
    pub spotlight_radius: f32,
}

/// アニメーション状態（描画側が読むプレゼンテーション状態）
#[derive(Debug, Clone, Default, Component)]
pub struct Animation {
    pub state: i32,
    pub is_animating: bool,
    pub rainbow_enabled: bool,
}

impl Animation {
    pub fn set_state(&mut self, state: i32) {
        self.state = state;
    }
}

/// パワーアップブロックのアニメーション状態
pub const POWER_UP_BLOCK_ACTIVE: i32 = 0;
pub const POWER_UP_BLOCK_INACTIVE: i32 = 1;

/// 衝突検出の出力レコード
///
/// ティックごとの一時リストとしてレジストリに記録され、
/// 相互作用の解決が終わるとクリアされます。ティックをまたいで
/// 持ち越されることはありません。
#[derive(Debug, Clone)]
pub struct Collision {
    pub other: Entity,
    /// すでに重なっていた場合のフォールバック用変位ベクトル
    pub displacement: Vec2,
}
