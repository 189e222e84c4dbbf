//! 衝突検出モジュール
//!
//! このモジュールは、Collidableマーカーを持つエンティティ間の
//! 軸平行ボックス（AABB）重なり検出と、進入方向を判別するための
//! スウェプト判定を提供します。
//!
//! 地形は軸平行で速度は1ティックあたり有界なので、連続時間ソルバは
//! 使わず前回位置と現在位置の比較で十分という割り切りです。

use crate::ecs::Entity;
use crate::game::components::{Collision, Position};
use crate::game::registry::GameRegistry;
use crate::utils::math::Vec2;

/// 二つのAABBが現在位置で重なっているか
pub fn overlaps(a: &Position, b: &Position) -> bool {
    let a_half = half_extent(a);
    let b_half = half_extent(b);
    (a.position.x - a_half.x) < (b.position.x + b_half.x)
        && (a.position.x + a_half.x) > (b.position.x - b_half.x)
        && (a.position.y - a_half.y) < (b.position.y + b_half.y)
        && (a.position.y + a_half.y) > (b.position.y - b_half.y)
}

/// iが左側からjに進入したか
///
/// 前ティックではiの右端がjの左端より手前にあり、現在は到達している
/// ことを確認します。すでに重なっていた場合はどの判定も成立せず、
/// フォールバックの変位解決に落ちます。
pub fn collided_left(pos_i: &Position, pos_j: &Position) -> bool {
    let i_half = half_extent(pos_i);
    let j_half = half_extent(pos_j);
    (pos_i.prev_position.x + i_half.x) <= (pos_j.position.x - j_half.x)
        && (pos_i.position.x + i_half.x) >= (pos_j.position.x - j_half.x)
}

/// iが右側からjに進入したか
pub fn collided_right(pos_i: &Position, pos_j: &Position) -> bool {
    let i_half = half_extent(pos_i);
    let j_half = half_extent(pos_j);
    (pos_i.prev_position.x - i_half.x) >= (pos_j.position.x + j_half.x)
        && (pos_i.position.x - i_half.x) <= (pos_j.position.x + j_half.x)
}

/// iが上側からjに進入したか
pub fn collided_top(pos_i: &Position, pos_j: &Position) -> bool {
    let i_half = half_extent(pos_i);
    let j_half = half_extent(pos_j);
    (pos_i.prev_position.y + i_half.y) <= (pos_j.position.y - j_half.y)
        && (pos_i.position.y + i_half.y) >= (pos_j.position.y - j_half.y)
}

/// iが下側からjに進入したか
pub fn collided_bottom(pos_i: &Position, pos_j: &Position) -> bool {
    let i_half = half_extent(pos_i);
    let j_half = half_extent(pos_j);
    (pos_i.prev_position.y - i_half.y) >= (pos_j.position.y + j_half.y)
        && (pos_i.position.y - i_half.y) <= (pos_j.position.y + j_half.y)
}

/// すでに重なっているペアのためのフォールバック変位
///
/// 貫通が最小の軸に沿って、aをbの外へ押し出すベクトルを返します。
pub fn penetration_displacement(a: &Position, b: &Position) -> Vec2 {
    let a_half = half_extent(a);
    let b_half = half_extent(b);

    let overlap_x = if a.position.x < b.position.x {
        (a.position.x + a_half.x) - (b.position.x - b_half.x)
    } else {
        (b.position.x + b_half.x) - (a.position.x - a_half.x)
    };
    let overlap_y = if a.position.y < b.position.y {
        (a.position.y + a_half.y) - (b.position.y - b_half.y)
    } else {
        (b.position.y + b_half.y) - (a.position.y - a_half.y)
    };

    // 貫通が最小の軸を選ぶ
    if overlap_x < overlap_y {
        let sign = if a.position.x < b.position.x { -1.0 } else { 1.0 };
        Vec2::new(sign * overlap_x, 0.0)
    } else {
        let sign = if a.position.y < b.position.y { -1.0 } else { 1.0 };
        Vec2::new(0.0, sign * overlap_y)
    }
}

/// 衝突判定対象の全ペアを走査して衝突レコードを記録する
///
/// 重なっているペア(A, B)ごとに、(A, B)と(B, A)の両方向のレコードを
/// レジストリの一時リストに追加します。リストは相互作用の解決後に
/// クリアされ、ティックをまたいで持ち越されることはありません。
pub fn detect_collisions(registry: &mut GameRegistry) {
    let entities: Vec<Entity> = registry
        .collidables
        .entities()
        .into_iter()
        .filter(|&e| registry.positions.has(e))
        .collect();

    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            let a = entities[i];
            let b = entities[j];
            let pos_a = registry.positions.get(a);
            let pos_b = registry.positions.get(b);
            if !overlaps(pos_a, pos_b) {
                continue;
            }
            let displacement = penetration_displacement(pos_a, pos_b);
            registry.collisions.push((
                a,
                Collision {
                    other: b,
                    displacement,
                },
            ));
            registry.collisions.push((
                b,
                Collision {
                    other: a,
                    displacement: -displacement,
                },
            ));
        }
    }
}

fn half_extent(pos: &Position) -> Vec2 {
    Vec2::new(pos.scale.x.abs() / 2.0, pos.scale.y.abs() / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_at(x: f32, y: f32, w: f32, h: f32) -> Position {
        Position {
            position: Vec2::new(x, y),
            prev_position: Vec2::new(x, y),
            scale: Vec2::new(w, h),
            angle: 0.0,
        }
    }

    #[test]
    fn test_overlap_detection() {
        let a = box_at(0.0, 0.0, 20.0, 20.0);
        let b = box_at(15.0, 0.0, 20.0, 20.0);
        let c = box_at(25.0, 0.0, 20.0, 20.0);
        assert!(overlaps(&a, &b));
        assert!(!overlaps(&a, &c));
    }

    #[test]
    fn test_swept_left_predicate() {
        // 右端がjの左端(x=40)を跨いで進入
        let mut i = box_at(35.0, 0.0, 20.0, 20.0);
        i.prev_position = Vec2::new(25.0, 0.0);
        let j = box_at(50.0, 0.0, 20.0, 20.0);
        assert!(collided_left(&i, &j));
        assert!(!collided_right(&i, &j));

        // 前ティックですでに重なっていた場合は成立しない
        i.prev_position = Vec2::new(35.0, 0.0);
        assert!(!collided_left(&i, &j));
    }

    #[test]
    fn test_swept_vertical_predicates() {
        // 上から進入（y軸は下向き正）
        let mut i = box_at(0.0, 35.0, 20.0, 20.0);
        i.prev_position = Vec2::new(0.0, 25.0);
        let j = box_at(0.0, 50.0, 20.0, 20.0);
        assert!(collided_top(&i, &j));
        assert!(!collided_bottom(&i, &j));

        // 下から進入
        let mut i = box_at(0.0, 65.0, 20.0, 20.0);
        i.prev_position = Vec2::new(0.0, 75.0);
        assert!(collided_bottom(&i, &j));
        assert!(!collided_top(&i, &j));
    }

    #[test]
    fn test_negative_scale_uses_absolute_extent() {
        // 反転描画でscale.xが負でも衝突判定は同じ
        let a = box_at(0.0, 0.0, -20.0, 20.0);
        let b = box_at(15.0, 0.0, 20.0, 20.0);
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn test_penetration_displacement_minimal_axis() {
        let a = box_at(15.0, 0.0, 20.0, 20.0);
        let b = box_at(0.0, 0.0, 20.0, 20.0);
        // x軸の貫通5がy軸の貫通20より小さいので、aは+x方向へ押し出される
        assert_eq!(penetration_displacement(&a, &b), Vec2::new(5.0, 0.0));
        // 反対側にいる場合は-x方向
        let c = box_at(-15.0, 0.0, 20.0, 20.0);
        assert_eq!(penetration_displacement(&c, &b), Vec2::new(-5.0, 0.0));
    }

    #[test]
    fn test_detect_records_both_orderings() {
        let mut registry = GameRegistry::new();
        let a = Entity::new();
        let b = Entity::new();
        *registry.positions.emplace(a) = box_at(0.0, 0.0, 20.0, 20.0);
        *registry.positions.emplace(b) = box_at(15.0, 0.0, 20.0, 20.0);
        registry.collidables.emplace(a);
        registry.collidables.emplace(b);

        detect_collisions(&mut registry);

        assert_eq!(registry.collisions.len(), 2);
        let first = &registry.collisions[0];
        let second = &registry.collisions[1];
        assert_eq!(first.0, a);
        assert_eq!(first.1.other, b);
        assert_eq!(second.0, b);
        assert_eq!(second.1.other, a);
        assert_eq!(first.1.displacement, -second.1.displacement);
    }

    #[test]
    fn test_non_collidable_entities_are_ignored() {
        let mut registry = GameRegistry::new();
        let a = Entity::new();
        let b = Entity::new();
        *registry.positions.emplace(a) = box_at(0.0, 0.0, 20.0, 20.0);
        *registry.positions.emplace(b) = box_at(5.0, 0.0, 20.0, 20.0);
        registry.collidables.emplace(a);
        // bはCollidableを持たない

        detect_collisions(&mut registry);
        assert!(registry.collisions.is_empty());
    }
}
