//! 運動積分モジュール
//!
//! PositionとVelocityを両方持つエンティティの位置を毎ティック前進させます。
//! スウェプト衝突判定が新鮮な前回位置を参照できるよう、
//! 必ず衝突検出より前に実行します。

use crate::game::registry::GameRegistry;

/// 速度から位置を積分する
///
/// `prev_position := position; position += velocity * dt` を
/// 全対象エンティティに適用します。フォロワーはVelocityを持たないため
/// 構造的に積分の対象外で、オーナー位置確定後の同期パスで更新されます。
pub fn integrate(registry: &mut GameRegistry, elapsed_ms: f32) {
    let dt = elapsed_ms / 1000.0;
    let GameRegistry {
        positions,
        velocities,
        ..
    } = registry;

    for (entity, velocity) in velocities.iter() {
        if !positions.has(entity) {
            continue;
        }
        let position = positions.get_mut(entity);
        position.prev_position = position.position;
        position.position += velocity.velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Entity;
    use crate::utils::math::Vec2;

    #[test]
    fn test_prev_position_equals_pre_step_position() {
        let mut registry = GameRegistry::new();
        let entity = Entity::new();
        let position = registry.positions.emplace(entity);
        position.position = Vec2::new(10.0, 20.0);
        registry.velocities.emplace(entity).velocity = Vec2::new(100.0, -50.0);

        integrate(&mut registry, 100.0);

        let position = registry.positions.get(entity);
        assert_eq!(position.prev_position, Vec2::new(10.0, 20.0));
        assert_eq!(position.position, Vec2::new(20.0, 15.0));
    }

    #[test]
    fn test_zero_velocity_means_stationary() {
        let mut registry = GameRegistry::new();
        let entity = Entity::new();
        registry.positions.emplace(entity).position = Vec2::new(5.0, 5.0);
        registry.velocities.emplace(entity);

        integrate(&mut registry, 16.0);

        let position = registry.positions.get(entity);
        assert_eq!(position.position, Vec2::new(5.0, 5.0));
        assert_eq!(position.prev_position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_entities_without_velocity_are_untouched() {
        let mut registry = GameRegistry::new();
        let entity = Entity::new();
        registry.positions.emplace(entity).position = Vec2::new(1.0, 2.0);

        integrate(&mut registry, 16.0);

        assert_eq!(
            registry.positions.get(entity).position,
            Vec2::new(1.0, 2.0)
        );
    }
}
