//! レベルデータモジュール
//!
//! レベルレイアウトはこのコアにとって不透明なデータソースです。
//! `LevelSource` がレベルIDからレイアウト記述子を返し、
//! ワールド初期化がそれをエンティティへ展開します。
//! レイアウトはJSONからも読み込めます（手書きレベルデータ用）。

use serde::{Deserialize, Serialize};

use crate::game::elements::ElementType;
use crate::utils::math::Vec2;

/// レベル識別子。通常レベルは+1で次へ進む
pub type LevelId = u32;

/// ボスレベルとパワーアップ選択レベルのID
pub mod levels {
    use super::LevelId;

    pub const WATER_BOSS: LevelId = 3;
    pub const FIRE_BOSS: LevelId = 5;
    pub const EARTH_BOSS: LevelId = 7;
    pub const LIGHTNING_BOSS: LevelId = 9;
    pub const FINAL_BOSS: LevelId = 10;
    /// 通常進行に割り込んで表示されるパワーアップ選択レベル
    pub const POWER_UP: LevelId = 100;
}

/// エレメントボスのレベルかどうか（最終ボスは含まない）
pub fn is_elemental_boss_level(level: LevelId) -> bool {
    matches!(
        level,
        levels::WATER_BOSS | levels::FIRE_BOSS | levels::EARTH_BOSS | levels::LIGHTNING_BOSS
    )
}

/// 地形記述子。`position` は左上隅、`size` は幅と高さ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainDescriptor {
    pub position: Vec2,
    pub size: Vec2,
    #[serde(default)]
    pub moveable: bool,
    /// 可動地形の初期x速度
    #[serde(default)]
    pub speed: f32,
}

/// 敵・ボス記述子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDescriptor {
    pub position: Vec2,
    pub element: ElementType,
    pub damage: f32,
}

/// 障害物記述子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleDescriptor {
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
}

/// テキストラベル記述子
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDescriptor {
    pub text: String,
    pub position: Vec2,
    pub scale: f32,
    pub color: (f32, f32, f32),
}

/// 一つのレベルのレイアウト
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelData {
    pub player_start: Vec2,
    /// 全敵撃破後に出口ドアが現れる位置（左上隅）。Noneならドアなし
    pub exit_door: Option<Vec2>,
    pub floors: Vec<Vec2>,
    pub terrains: Vec<TerrainDescriptor>,
    pub labels: Vec<LabelDescriptor>,
    pub enemies: Vec<EnemyDescriptor>,
    pub bosses: Vec<EnemyDescriptor>,
    pub obstacles: Vec<ObstacleDescriptor>,
}

impl LevelData {
    /// JSON文字列からレイアウトを読み込む
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// レベルデータソースの契約
///
/// コアはレベルIDしか知らず、レイアウトの出どころ（組み込み・JSON・
/// エディタ等）には関与しません。
pub trait LevelSource {
    fn load(&self, level: LevelId) -> Option<LevelData>;
}

/// 組み込みのサンプルレベル
pub struct BuiltinLevels;

impl BuiltinLevels {
    /// 1800x1000のアリーナを囲む外壁
    fn arena_walls() -> Vec<TerrainDescriptor> {
        let wall = |x: f32, y: f32, w: f32, h: f32| TerrainDescriptor {
            position: Vec2::new(x, y),
            size: Vec2::new(w, h),
            moveable: false,
            speed: 0.0,
        };
        vec![
            wall(0.0, 0.0, 1800.0, 100.0),
            wall(0.0, 50.0, 100.0, 900.0),
            wall(0.0, 900.0, 1800.0, 100.0),
            wall(1700.0, 50.0, 100.0, 900.0),
        ]
    }

    fn floor_grid() -> Vec<Vec2> {
        let mut floors = Vec::new();
        for i in 0..6 {
            for j in 0..4 {
                floors.push(Vec2::new(225.0 + i as f32 * 250.0, 175.0 + j as f32 * 250.0));
            }
        }
        for i in 0..4 {
            floors.push(Vec2::new(1600.0, 175.0 + i as f32 * 250.0));
        }
        floors
    }
}

impl LevelSource for BuiltinLevels {
    fn load(&self, level: LevelId) -> Option<LevelData> {
        let mut data = LevelData {
            player_start: Vec2::new(200.0, 700.0),
            exit_door: Some(Vec2::new(1500.0, 850.0)),
            floors: Self::floor_grid(),
            terrains: Self::arena_walls(),
            ..LevelData::default()
        };

        match level {
            0 | 1 => {
                // 内壁の仕切り
                for (x, y) in [(350.0, 400.0), (750.0, 0.0), (1150.0, 400.0)] {
                    data.terrains.push(TerrainDescriptor {
                        position: Vec2::new(x, y + 100.0),
                        size: Vec2::new(100.0, 500.0),
                        moveable: false,
                        speed: 0.0,
                    });
                }
                data.enemies = vec![
                    EnemyDescriptor {
                        position: Vec2::new(800.0, 700.0),
                        element: ElementType::Water,
                        damage: 10.0,
                    },
                    EnemyDescriptor {
                        position: Vec2::new(1200.0, 300.0),
                        element: ElementType::Fire,
                        damage: 10.0,
                    },
                ];
                if level == 1 {
                    data.obstacles = vec![ObstacleDescriptor {
                        position: Vec2::new(900.0, 500.0),
                        size: Vec2::new(80.0, 80.0),
                        velocity: Vec2::new(120.0, 90.0),
                    }];
                }
                Some(data)
            }
            2 => {
                data.terrains.push(TerrainDescriptor {
                    position: Vec2::new(550.0, 350.0),
                    size: Vec2::new(100.0, 100.0),
                    moveable: true,
                    speed: 80.0,
                });
                data.enemies = vec![EnemyDescriptor {
                    position: Vec2::new(300.0, 600.0),
                    element: ElementType::Earth,
                    damage: 10.0,
                }];
                Some(data)
            }
            levels::WATER_BOSS => {
                data.exit_door = None;
                data.bosses = vec![EnemyDescriptor {
                    position: Vec2::new(900.0, 400.0),
                    element: ElementType::Water,
                    damage: 20.0,
                }];
                Some(data)
            }
            levels::FINAL_BOSS => {
                data.exit_door = None;
                data.bosses = vec![EnemyDescriptor {
                    position: Vec2::new(900.0, 400.0),
                    element: ElementType::Combo,
                    damage: 30.0,
                }];
                Some(data)
            }
            levels::POWER_UP => {
                // 敵のいない選択部屋。ドアはすぐに出現する
                data.labels = vec![LabelDescriptor {
                    text: "Choose a power up".to_string(),
                    position: Vec2::new(700.0, 150.0),
                    scale: 1.0,
                    color: (1.0, 1.0, 1.0),
                }];
                Some(data)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_exist() {
        let source = BuiltinLevels;
        assert!(source.load(0).is_some());
        assert!(source.load(levels::POWER_UP).is_some());
        assert!(source.load(levels::WATER_BOSS).is_some());
        assert!(source.load(9999).is_none());
    }

    #[test]
    fn test_level_data_from_json() {
        let json = r#"{
            "player_start": { "x": 100.0, "y": 200.0 },
            "exit_door": { "x": 1500.0, "y": 850.0 },
            "floors": [],
            "terrains": [
                { "position": { "x": 0.0, "y": 0.0 }, "size": { "x": 800.0, "y": 100.0 } }
            ],
            "labels": [],
            "enemies": [
                { "position": { "x": 400.0, "y": 300.0 }, "element": "Fire", "damage": 15.0 }
            ],
            "bosses": [],
            "obstacles": []
        }"#;

        let data = LevelData::from_json(json).unwrap();
        assert_eq!(data.player_start, Vec2::new(100.0, 200.0));
        assert_eq!(data.terrains.len(), 1);
        assert!(!data.terrains[0].moveable);
        assert_eq!(data.enemies[0].element, ElementType::Fire);
    }
}
