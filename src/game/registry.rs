//! ゲームレジストリモジュール
//!
//! 固定のコンポーネントセットに対するストア・オブ・ストアズです。
//! 新しいコンポーネント型は `game_registry!` のリストに
//! 一行追加するだけで導入できます。

use crate::ecs::{ComponentStore, Entity};
use crate::game::components::*;

/// 固定のストア一覧からレジストリ本体と一括削除を生成するマクロ
macro_rules! game_registry {
    ($( $field:ident : $ty:ty ),+ $(,)?) => {
        /// すべてのコンポーネントストアを束ねるレジストリ
        ///
        /// シミュレーションティックのあいだ、単一スレッドが排他的に所有します。
        pub struct GameRegistry {
            $(pub $field: ComponentStore<$ty>,)+
            /// ティックごとの一時的な衝突ペアリスト
            ///
            /// 衝突検出が書き込み、相互作用の解決が消費してクリアします。
            pub collisions: Vec<(Entity, Collision)>,
        }

        impl GameRegistry {
            /// 新しい空のレジストリを作成
            pub fn new() -> Self {
                Self {
                    $($field: ComponentStore::new(),)+
                    collisions: Vec::new(),
                }
            }

            /// エンティティのすべてのコンポーネントを削除
            ///
            /// 未処理の衝突レコードからも取り除きます。コンポーネントを
            /// 持たないエンティティに対しては何もしません（冪等）。
            /// 衝突ペアリストの反復中は使わず、
            /// `remove_all_components_of_no_collision` を使います。
            pub fn remove_all_components_of(&mut self, entity: Entity) {
                $(self.$field.remove_if_present(entity);)+
                self.collisions
                    .retain(|(e, c)| *e != entity && c.other != entity);
            }

            /// 衝突ペアリストを除いてすべてのコンポーネントを削除
            ///
            /// 衝突解決のパス内からエンティティを破棄するときに使う変種です。
            /// 反復中のペアリストには触れないため、残ったレコードの参照先は
            /// 消費側が `has` で存在確認してから使用します。
            pub fn remove_all_components_of_no_collision(&mut self, entity: Entity) {
                $(self.$field.remove_if_present(entity);)+
            }

            /// すべてのストアをクリア（終了処理用）
            pub fn clear_all_components(&mut self) {
                $(self.$field.clear();)+
                self.collisions.clear();
            }
        }
    };
}

game_registry! {
    positions: Position,
    velocities: Velocity,
    resources: Resources,
    collidables: Collidable,
    players: Player,
    enemies: Enemy,
    bosses: Boss,
    projectiles: Projectile,
    terrain: Terrain,
    obstacles: Obstacle,
    floors: Floor,
    exit_doors: ExitDoor,
    power_ups: PowerUp,
    power_up_blocks: PowerUpBlock,
    character_projectile_types: CharacterProjectileType,
    followers: Follower,
    secondary_followers: SecondaryFollower,
    health_bars: HealthBar,
    mana_bars: ManaBar,
    texts: Text,
    invulnerable_timers: InvulnerableTimer,
    death_timers: DeathTimer,
    win_timers: WinTimer,
    screen_states: ScreenState,
    animations: Animation,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::Vec2;

    #[test]
    fn test_remove_all_components_of() {
        let mut registry = GameRegistry::new();
        let entity = Entity::new();
        registry.positions.emplace(entity);
        registry.velocities.emplace(entity);
        registry.enemies.emplace(entity);
        registry.collidables.emplace(entity);

        registry.remove_all_components_of(entity);

        assert!(!registry.positions.has(entity));
        assert!(!registry.velocities.has(entity));
        assert!(!registry.enemies.has(entity));
        assert!(!registry.collidables.has(entity));
    }

    #[test]
    fn test_remove_all_is_idempotent_on_empty_entity() {
        let mut registry = GameRegistry::new();
        let entity = Entity::new();
        // コンポーネントを持たないエンティティでもパニックしない
        registry.remove_all_components_of(entity);
        registry.remove_all_components_of(entity);
    }

    #[test]
    fn test_remove_all_purges_pending_collisions() {
        let mut registry = GameRegistry::new();
        let a = Entity::new();
        let b = Entity::new();
        registry.positions.emplace(a);
        registry.collisions.push((
            a,
            Collision {
                other: b,
                displacement: Vec2::ZERO,
            },
        ));
        registry.collisions.push((
            b,
            Collision {
                other: a,
                displacement: Vec2::ZERO,
            },
        ));

        registry.remove_all_components_of(a);
        assert!(registry.collisions.is_empty());
    }

    #[test]
    fn test_no_collision_variant_leaves_pair_list() {
        let mut registry = GameRegistry::new();
        let a = Entity::new();
        let b = Entity::new();
        registry.positions.emplace(a);
        registry.collisions.push((
            a,
            Collision {
                other: b,
                displacement: Vec2::ZERO,
            },
        ));

        registry.remove_all_components_of_no_collision(a);
        assert!(!registry.positions.has(a));
        assert_eq!(registry.collisions.len(), 1);
    }
}
