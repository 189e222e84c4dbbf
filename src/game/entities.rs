//! エンティティファクトリモジュール
//!
//! ゲームエンティティの生成ロジックを集約します。各ファクトリは
//! レジストリにコンポーネント一式を登録して新しいエンティティを返します。
//! レベルデータ上の矩形は左上隅＋サイズで表されるため、
//! ここで中心座標へ変換します。

use crate::ecs::Entity;
use crate::game::components::*;
use crate::game::elements::ElementType;
use crate::game::registry::GameRegistry;
use crate::utils::math::{velocity_from_angle, Vec2};

pub const PLAYER_SCALE: Vec2 = Vec2::new(63.0, 100.0);
pub const ENEMY_SCALE: Vec2 = Vec2::new(100.0, 100.0);
pub const BOSS_SCALE: Vec2 = Vec2::new(230.0, 200.0);
pub const EXIT_DOOR_SCALE: Vec2 = Vec2::new(100.0, 120.0);
pub const POWER_UP_BLOCK_SCALE: Vec2 = Vec2::new(90.0, 90.0);
pub const PROJECTILE_SCALE: Vec2 = Vec2::new(30.0, 30.0);
pub const FLOOR_SCALE: Vec2 = Vec2::new(250.0, 250.0);
const HEALTH_BAR_SCALE: Vec2 = Vec2::new(80.0, 10.0);
const BOSS_HEALTH_BAR_SCALE: Vec2 = Vec2::new(600.0, 30.0);

pub const ENEMY_SPEED: f32 = 50.0;
pub const BOSS_SPEED: f32 = 25.0;
pub const BOSS_HEALTH: f32 = 1500.0;
pub const PROJECTILE_SPEED: f32 = 700.0;

/// プレイヤーを生成する
///
/// パワーアップと選択中エレメントはデフォルトで登録されるため、
/// リセットをまたぐ持ち越しは呼び出し側が上書きします。
pub fn create_player(registry: &mut GameRegistry, position: Vec2) -> Entity {
    let entity = Entity::new();
    let pos = registry.positions.emplace(entity);
    pos.position = position;
    pos.prev_position = position;
    pos.scale = PLAYER_SCALE;
    registry.velocities.emplace(entity);
    registry.resources.emplace(entity);
    registry.collidables.emplace(entity);
    registry.players.emplace(entity);
    registry.power_ups.emplace(entity);
    registry.character_projectile_types.emplace(entity);

    let health_bar = create_health_bar(registry, entity, 0.0, -70.0, HEALTH_BAR_SCALE);
    let mana_bar = create_mana_bar(registry, entity, 0.0, -85.0);
    let resources = registry.resources.get_mut(entity);
    resources.health_bar = Some(health_bar);
    resources.mana_bar = Some(mana_bar);
    entity
}

/// 体力バーを生成する（ownerに追従する）
pub fn create_health_bar(
    registry: &mut GameRegistry,
    owner: Entity,
    x_offset: f32,
    y_offset: f32,
    scale: Vec2,
) -> Entity {
    let entity = Entity::new();
    registry.positions.emplace(entity).scale = scale;
    registry.followers.insert(
        entity,
        Follower {
            owner,
            x_offset,
            y_offset,
        },
    );
    registry.health_bars.insert(entity, HealthBar { owner });
    entity
}

/// マナバーを生成する（ownerに追従する）
pub fn create_mana_bar(
    registry: &mut GameRegistry,
    owner: Entity,
    x_offset: f32,
    y_offset: f32,
) -> Entity {
    let entity = Entity::new();
    registry.positions.emplace(entity).scale = HEALTH_BAR_SCALE;
    registry.followers.insert(
        entity,
        Follower {
            owner,
            x_offset,
            y_offset,
        },
    );
    registry.mana_bars.insert(entity, ManaBar { owner });
    entity
}

/// 敵を生成する
pub fn create_enemy(
    registry: &mut GameRegistry,
    position: Vec2,
    element: ElementType,
    damage: f32,
) -> Entity {
    let entity = Entity::new();
    let pos = registry.positions.emplace(entity);
    pos.position = position;
    pos.prev_position = position;
    pos.scale = ENEMY_SCALE;
    registry.velocities.emplace(entity).velocity = Vec2::new(ENEMY_SPEED, 0.0);
    registry.resources.emplace(entity);
    registry.collidables.emplace(entity);
    registry.enemies.insert(
        entity,
        Enemy {
            element,
            damage,
            is_aggravated: false,
        },
    );

    let health_bar = create_health_bar(registry, entity, 0.0, -60.0, HEALTH_BAR_SCALE);
    registry.resources.get_mut(entity).health_bar = Some(health_bar);
    entity
}

/// ボスを生成する
///
/// 体力バーは画面上部に出すため `bar_owner`（通常はプレイヤー）に
/// 追従させます。複合属性のボスはオーラ演出のフォロワーを持ちます。
pub fn create_boss(
    registry: &mut GameRegistry,
    position: Vec2,
    element: ElementType,
    damage: f32,
    bar_owner: Entity,
) -> Entity {
    let entity = Entity::new();
    let pos = registry.positions.emplace(entity);
    pos.position = position;
    pos.prev_position = position;
    pos.scale = BOSS_SCALE;
    registry.velocities.emplace(entity).velocity = Vec2::new(BOSS_SPEED, 0.0);
    let resources = registry.resources.emplace(entity);
    resources.current_health = BOSS_HEALTH;
    resources.max_health = BOSS_HEALTH;
    registry.collidables.emplace(entity);
    registry.enemies.insert(
        entity,
        Enemy {
            element,
            damage,
            is_aggravated: false,
        },
    );

    let aura = if element == ElementType::Combo {
        let aura = Entity::new();
        let aura_pos = registry.positions.emplace(aura);
        aura_pos.scale = Vec2::new(280.0, 250.0);
        registry.followers.insert(
            aura,
            Follower {
                owner: entity,
                x_offset: 0.0,
                y_offset: 0.0,
            },
        );
        let animation = registry.animations.emplace(aura);
        animation.is_animating = true;
        animation.rainbow_enabled = true;
        Some(aura)
    } else {
        None
    };
    registry.bosses.insert(entity, Boss { aura });

    let health_bar = create_health_bar(registry, entity, 0.0, -450.0, BOSS_HEALTH_BAR_SCALE);
    // ボスのバーはプレイヤーに追従して画面内に留まる
    if registry.positions.has(bar_owner) {
        registry.followers.get_mut(health_bar).owner = bar_owner;
    }
    registry.resources.get_mut(entity).health_bar = Some(health_bar);
    entity
}

/// 地形ブロックを生成する（`top_left` は左上隅）
pub fn create_terrain(
    registry: &mut GameRegistry,
    top_left: Vec2,
    size: Vec2,
    moveable: bool,
    speed: f32,
) -> Entity {
    let entity = Entity::new();
    let center = top_left + size * 0.5;
    let pos = registry.positions.emplace(entity);
    pos.position = center;
    pos.prev_position = center;
    pos.scale = size;
    registry.collidables.emplace(entity);
    registry.terrain.insert(entity, Terrain { moveable });
    if moveable {
        registry.velocities.emplace(entity).velocity = Vec2::new(speed, 0.0);
    }
    entity
}

/// 床タイルを生成する（衝突判定には参加しない）
pub fn create_floor(registry: &mut GameRegistry, position: Vec2) -> Entity {
    let entity = Entity::new();
    let pos = registry.positions.emplace(entity);
    pos.position = position;
    pos.scale = FLOOR_SCALE;
    registry.floors.emplace(entity);
    entity
}

/// 障害物（即死ハザード）を生成する（`top_left` は左上隅）
pub fn create_obstacle(
    registry: &mut GameRegistry,
    top_left: Vec2,
    size: Vec2,
    velocity: Vec2,
) -> Entity {
    let entity = Entity::new();
    let center = top_left + size * 0.5;
    let pos = registry.positions.emplace(entity);
    pos.position = center;
    pos.prev_position = center;
    pos.scale = size;
    registry.velocities.emplace(entity).velocity = velocity;
    registry.collidables.emplace(entity);
    registry.obstacles.emplace(entity);
    entity
}

/// 出口ドアを生成する（`top_left` は左上隅）
pub fn create_exit_door(registry: &mut GameRegistry, top_left: Vec2) -> Entity {
    let entity = Entity::new();
    let center = top_left + EXIT_DOOR_SCALE * 0.5;
    let pos = registry.positions.emplace(entity);
    pos.position = center;
    pos.prev_position = center;
    pos.scale = EXIT_DOOR_SCALE;
    registry.collidables.emplace(entity);
    registry.exit_doors.emplace(entity);
    entity
}

/// パワーアップブロックを生成する
///
/// ブロックは未選択状態（アニメーション有効・レインボー）で出現します。
pub fn create_power_up_block(
    registry: &mut GameRegistry,
    position: Vec2,
    kind: PowerUpKind,
) -> Entity {
    let entity = Entity::new();
    let pos = registry.positions.emplace(entity);
    pos.position = position;
    pos.prev_position = position;
    pos.scale = POWER_UP_BLOCK_SCALE;
    registry.collidables.emplace(entity);
    registry.power_up_blocks.insert(
        entity,
        PowerUpBlock {
            label: kind.label(),
            kind,
            text_entity: None,
        },
    );
    let animation = registry.animations.emplace(entity);
    animation.state = POWER_UP_BLOCK_ACTIVE;
    animation.is_animating = true;
    animation.rainbow_enabled = true;
    entity
}

/// 弾を生成する
///
/// プレイヤーの弾（hostile = false）はパワーアップの効果を受けます。
/// トリプルショットはダメージ半減、強化ダメージは1.5倍、
/// 壁反射は反射回数2回を与えます。
pub fn create_projectile(
    registry: &mut GameRegistry,
    position: Vec2,
    angle: f32,
    element: ElementType,
    hostile: bool,
    power_up: Option<&PowerUp>,
) -> Entity {
    let mut projectile = Projectile {
        element,
        hostile,
        ..Projectile::default()
    };
    if !hostile {
        if let Some(power_up) = power_up {
            if power_up.is_enabled(PowerUpKind::TripleShot(element)) {
                projectile.damage *= 0.5;
            }
            if power_up.is_enabled(PowerUpKind::IncreasedDamage(element)) {
                projectile.damage *= 1.5;
            }
            if power_up.is_enabled(PowerUpKind::BounceOffWalls(element)) {
                projectile.bounces = 2;
            }
        }
    }

    let entity = Entity::new();
    let pos = registry.positions.emplace(entity);
    pos.position = position;
    pos.prev_position = position;
    pos.scale = PROJECTILE_SCALE;
    pos.angle = angle;
    registry.velocities.emplace(entity).velocity = velocity_from_angle(PROJECTILE_SPEED, angle);
    registry.collidables.emplace(entity);
    registry.projectiles.insert(entity, projectile);
    entity
}

/// 画面上のテキストラベルを生成する
pub fn create_text(
    registry: &mut GameRegistry,
    text: &str,
    position: Vec2,
    scale: f32,
    color: (f32, f32, f32),
) -> Entity {
    let entity = Entity::new();
    let pos = registry.positions.emplace(entity);
    pos.position = position;
    pos.scale = Vec2::new(scale, scale);
    registry.texts.insert(
        entity,
        Text {
            text: text.to_string(),
            color,
        },
    );
    entity
}

/// 選択中エレメントの表示エンティティを生成する（プレイヤーに追従）
pub fn create_projectile_select_display(registry: &mut GameRegistry, player: Entity) -> Entity {
    let entity = Entity::new();
    registry.positions.emplace(entity).scale = Vec2::new(50.0, 50.0);
    registry.followers.insert(
        entity,
        Follower {
            owner: player,
            x_offset: -60.0,
            y_offset: -80.0,
        },
    );
    registry.animations.emplace(entity);
    entity
}

/// パワーアップインジケータを生成する（エレメント表示に追従する二次フォロワー）
pub fn create_power_up_indicator(registry: &mut GameRegistry, display: Entity) -> Entity {
    let entity = Entity::new();
    registry.positions.emplace(entity).scale = Vec2::new(40.0, 40.0);
    registry.secondary_followers.insert(
        entity,
        SecondaryFollower {
            owner: display,
            x_offset: 0.0,
            y_offset: -40.0,
        },
    );
    registry.animations.emplace(entity);
    entity
}

/// 画面演出状態のシングルトンを生成する
pub fn create_screen_state(registry: &mut GameRegistry) -> Entity {
    let entity = Entity::new();
    registry.screen_states.emplace(entity);
    entity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_component_set() {
        let mut registry = GameRegistry::new();
        let player = create_player(&mut registry, Vec2::new(100.0, 200.0));

        assert!(registry.players.has(player));
        assert!(registry.collidables.has(player));
        assert!(registry.power_ups.has(player));
        assert!(registry.character_projectile_types.has(player));
        assert_eq!(registry.positions.get(player).scale, PLAYER_SCALE);

        let resources = registry.resources.get(player);
        let health_bar = resources.health_bar.unwrap();
        let mana_bar = resources.mana_bar.unwrap();
        assert!(registry.health_bars.has(health_bar));
        assert!(registry.mana_bars.has(mana_bar));
        assert_eq!(registry.followers.get(health_bar).owner, player);
    }

    #[test]
    fn test_terrain_center_conversion() {
        let mut registry = GameRegistry::new();
        let terrain = create_terrain(
            &mut registry,
            Vec2::new(0.0, 0.0),
            Vec2::new(200.0, 100.0),
            false,
            0.0,
        );
        let pos = registry.positions.get(terrain);
        assert_eq!(pos.position, Vec2::new(100.0, 50.0));
        assert_eq!(pos.scale, Vec2::new(200.0, 100.0));
        assert!(!registry.velocities.has(terrain));
    }

    #[test]
    fn test_moveable_terrain_has_velocity() {
        let mut registry = GameRegistry::new();
        let terrain = create_terrain(
            &mut registry,
            Vec2::ZERO,
            Vec2::new(100.0, 100.0),
            true,
            80.0,
        );
        assert!(registry.terrain.get(terrain).moveable);
        assert_eq!(
            registry.velocities.get(terrain).velocity,
            Vec2::new(80.0, 0.0)
        );
    }

    #[test]
    fn test_final_boss_gets_aura_follower() {
        let mut registry = GameRegistry::new();
        let player = create_player(&mut registry, Vec2::ZERO);
        let boss = create_boss(
            &mut registry,
            Vec2::new(900.0, 400.0),
            ElementType::Combo,
            30.0,
            player,
        );

        assert!(registry.enemies.has(boss));
        let aura = registry.bosses.get(boss).aura.unwrap();
        assert_eq!(registry.followers.get(aura).owner, boss);
        assert!(registry.animations.get(aura).rainbow_enabled);
        assert_eq!(registry.resources.get(boss).max_health, BOSS_HEALTH);

        // ボスの体力バーはプレイヤーに追従する
        let bar = registry.resources.get(boss).health_bar.unwrap();
        assert_eq!(registry.followers.get(bar).owner, player);
    }

    #[test]
    fn test_projectile_power_up_scaling() {
        let mut registry = GameRegistry::new();
        let mut power_up = PowerUp::default();
        power_up.set_enabled(PowerUpKind::TripleShot(ElementType::Fire), true);
        power_up.set_enabled(PowerUpKind::IncreasedDamage(ElementType::Fire), true);
        power_up.set_enabled(PowerUpKind::BounceOffWalls(ElementType::Fire), true);

        let projectile = create_projectile(
            &mut registry,
            Vec2::ZERO,
            0.0,
            ElementType::Fire,
            false,
            Some(&power_up),
        );
        let projectile = registry.projectiles.get(projectile);
        assert_eq!(projectile.damage, 20.0 * 0.5 * 1.5);
        assert_eq!(projectile.bounces, 2);

        // 敵の弾はパワーアップの影響を受けない
        let hostile = create_projectile(
            &mut registry,
            Vec2::ZERO,
            0.0,
            ElementType::Fire,
            true,
            Some(&power_up),
        );
        let hostile = registry.projectiles.get(hostile);
        assert_eq!(hostile.damage, 20.0);
        assert_eq!(hostile.bounces, 0);
    }

    #[test]
    fn test_power_up_block_spawns_unselected() {
        let mut registry = GameRegistry::new();
        let block = create_power_up_block(
            &mut registry,
            Vec2::new(700.0, 300.0),
            PowerUpKind::FasterMovement,
        );
        let animation = registry.animations.get(block);
        assert_eq!(animation.state, POWER_UP_BLOCK_ACTIVE);
        assert!(animation.is_animating);
        assert!(animation.rainbow_enabled);
        assert!(registry.power_up_blocks.get(block).text_entity.is_none());
    }
}
