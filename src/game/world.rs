//! ワールドシミュレーションモジュール
//!
//! 1ティックの流れは 積分 → 衝突検出 → 相互作用の解決 → タイマー更新 です。
//! 相互作用はエンティティペアの種別ごとの固定ルールで解決され、
//! タイマー（無敵・死亡・レベルクリア）が画面演出とレベル遷移を駆動します。
//!
//! 入力はメソッド呼び出し（`set_player_direction` / `fire_projectile` /
//! `select_element`）として受け取り、キーバインドには関与しません。

use std::mem;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::ecs::Entity;
use crate::game::audio::{AudioCue, AudioSink};
use crate::game::components::*;
use crate::game::elements::{is_weak_to, ElementType};
use crate::game::entities;
use crate::game::level::{is_elemental_boss_level, levels, LevelData, LevelId, LevelSource};
use crate::game::registry::GameRegistry;
use crate::physics::{
    collided_bottom, collided_left, collided_right, collided_top, detect_collisions, integrate,
};
use crate::utils::math::Vec2;

/// プレイヤーの基本移動速度（ピクセル/秒）
pub const PLAYER_SPEED: f32 = 300.0;
const FASTER_MOVEMENT_MULTIPLIER: f32 = 1.5;
/// トリプルショットの拡散角（ラジアン）
const TRIPLE_SHOT_SPREAD: f32 = 0.25;
/// 敵の弾が属性の異なる通常敵を通過したときの回復量
const HOSTILE_PASS_HEAL: f32 = 5.0;
/// レベル遷移後にスポットライトが再拡大する速さの除数
const SPOTLIGHT_EXPAND_DIVISOR: f32 = 400.0;

/// ワールドシミュレーション本体
///
/// レベルデータとオーディオはトレイトオブジェクト経由で注入され、
/// コアはウィンドウ・描画・音声再生の実装を知りません。
pub struct WorldSim {
    pub registry: GameRegistry,
    levels: Box<dyn LevelSource>,
    audio: Box<dyn AudioSink>,
    rng: SmallRng,
    player: Entity,
    screen_state: Entity,
    projectile_select_display: Entity,
    curr_level: LevelId,
    next_level: LevelId,
    curr_data: LevelData,
}

impl WorldSim {
    /// レベル0からワールドを開始する
    pub fn new(levels: Box<dyn LevelSource>, audio: Box<dyn AudioSink>) -> Self {
        let mut registry = GameRegistry::new();
        let screen_state = entities::create_screen_state(&mut registry);
        let mut world = Self {
            registry,
            levels,
            audio,
            rng: SmallRng::from_entropy(),
            player: Entity::new(),
            screen_state,
            projectile_select_display: Entity::new(),
            curr_level: 0,
            next_level: 0,
            curr_data: LevelData::default(),
        };
        world.restart_game();
        world
    }

    /// 指定レベルからワールドを構築し直す
    pub fn init(&mut self, level: LevelId) {
        self.curr_level = level;
        self.next_level = level;
        self.restart_game();
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn current_level(&self) -> LevelId {
        self.curr_level
    }

    /// 1ティックを実行する
    ///
    /// このティック中にワールドが再構築された場合はtrueを返します
    /// （死亡タイマー満了またはレベル遷移）。
    pub fn tick(&mut self, elapsed_ms: f32) -> bool {
        integrate(&mut self.registry, elapsed_ms);
        detect_collisions(&mut self.registry);
        self.handle_collisions();
        self.step(elapsed_ms)
    }

    /// プレイヤーの移動方向を設定する
    ///
    /// 方向は正規化されるため、斜め入力でも移動速度は一定です。
    /// 死亡中・クリア演出中は無視されます。
    pub fn set_player_direction(&mut self, direction: Vec2) {
        if self.player_is_locked() || !self.registry.velocities.has(self.player) {
            return;
        }
        let length = direction.length();
        let direction = if length > 0.0 {
            direction * (1.0 / length)
        } else {
            Vec2::ZERO
        };
        let mut speed = PLAYER_SPEED;
        if self.registry.power_ups.has(self.player)
            && self.registry.power_ups.get(self.player).faster_movement
        {
            speed *= FASTER_MOVEMENT_MULTIPLIER;
        }
        self.registry.velocities.get_mut(self.player).velocity = direction * speed;
    }

    /// 選択中の弾エレメントを切り替える
    pub fn select_element(&mut self, element: ElementType) {
        if element == ElementType::Combo {
            return;
        }
        if !self.registry.character_projectile_types.has(self.player) {
            return;
        }
        self.registry
            .character_projectile_types
            .get_mut(self.player)
            .element = element;
        if self.registry.animations.has(self.projectile_select_display) {
            self.registry
                .animations
                .get_mut(self.projectile_select_display)
                .set_state(element.index() as i32);
        }
    }

    /// 指定角度へ弾を発射する
    ///
    /// マナを1消費します。マナが足りなければ何も起きません。
    /// トリプルショットが有効なエレメントでは拡散角つきの3発になります。
    pub fn fire_projectile(&mut self, angle: f32) {
        if self.player_is_locked() {
            return;
        }
        if !self.registry.resources.has(self.player) || !self.registry.positions.has(self.player) {
            return;
        }
        if self.registry.resources.get(self.player).current_mana < 1.0 {
            return;
        }
        self.registry.resources.get_mut(self.player).current_mana -= 1.0;

        let element = self
            .registry
            .character_projectile_types
            .get(self.player)
            .element;
        let power_up = self.registry.power_ups.get(self.player).clone();
        let position = self.registry.positions.get(self.player).position;

        entities::create_projectile(
            &mut self.registry,
            position,
            angle,
            element,
            false,
            Some(&power_up),
        );
        if power_up.is_enabled(PowerUpKind::TripleShot(element)) {
            entities::create_projectile(
                &mut self.registry,
                position,
                angle - TRIPLE_SHOT_SPREAD,
                element,
                false,
                Some(&power_up),
            );
            entities::create_projectile(
                &mut self.registry,
                position,
                angle + TRIPLE_SHOT_SPREAD,
                element,
                false,
                Some(&power_up),
            );
        }
        self.audio.play(AudioCue::ProjectileFired);
    }

    /// 現在のレベルをクリア扱いにする（冪等）
    pub fn win_level(&mut self) {
        if self.registry.win_timers.has(self.player) {
            return;
        }
        if self.registry.velocities.has(self.player) {
            self.registry.velocities.get_mut(self.player).velocity = Vec2::ZERO;
        }
        self.registry.win_timers.emplace(self.player);
        self.audio.play(AudioCue::LevelEnd);
    }

    /// 現在のレベルでワールドを再構築する
    ///
    /// パワーアップ・選択中エレメント・進行中のクリアタイマーは
    /// 古いプレイヤーから新しいプレイヤーへ持ち越されます。
    pub fn restart_game(&mut self) {
        log::info!("restarting world at level {}", self.curr_level);

        let saved_power_up = self
            .registry
            .power_ups
            .has(self.player)
            .then(|| self.registry.power_ups.get(self.player).clone());
        let saved_projectile_type = self
            .registry
            .character_projectile_types
            .has(self.player)
            .then(|| {
                self.registry
                    .character_projectile_types
                    .get(self.player)
                    .clone()
            });
        let saved_win_timer = self
            .registry
            .win_timers
            .has(self.player)
            .then(|| self.registry.win_timers.get(self.player).clone());

        // 物理・リソース系のコンポーネントを持つ全エンティティを破棄
        loop {
            let Some(entity) = self.registry.positions.entities().last().copied() else {
                break;
            };
            self.registry.remove_all_components_of(entity);
        }
        loop {
            let Some(entity) = self.registry.velocities.entities().last().copied() else {
                break;
            };
            self.registry.remove_all_components_of(entity);
        }
        loop {
            let Some(entity) = self.registry.resources.entities().last().copied() else {
                break;
            };
            self.registry.remove_all_components_of(entity);
        }
        loop {
            let Some(entity) = self.registry.collidables.entities().last().copied() else {
                break;
            };
            self.registry.remove_all_components_of(entity);
        }
        self.registry
            .screen_states
            .get_mut(self.screen_state)
            .darken_screen_factor = 0.0;

        self.curr_data = match self.levels.load(self.curr_level) {
            Some(data) => data,
            None => {
                log::warn!("no data for level {}, wrapping to level 0", self.curr_level);
                self.curr_level = 0;
                self.next_level = 0;
                self.levels.load(0).unwrap_or_default()
            }
        };

        for &floor in &self.curr_data.floors {
            entities::create_floor(&mut self.registry, floor);
        }
        for terrain in &self.curr_data.terrains {
            entities::create_terrain(
                &mut self.registry,
                terrain.position,
                terrain.size,
                terrain.moveable,
                terrain.speed,
            );
        }
        for label in &self.curr_data.labels {
            entities::create_text(
                &mut self.registry,
                &label.text,
                label.position,
                label.scale,
                label.color,
            );
        }
        for obstacle in &self.curr_data.obstacles {
            entities::create_obstacle(
                &mut self.registry,
                obstacle.position,
                obstacle.size,
                obstacle.velocity,
            );
        }

        let player = entities::create_player(&mut self.registry, self.curr_data.player_start);
        self.player = player;
        self.projectile_select_display =
            entities::create_projectile_select_display(&mut self.registry, player);
        entities::create_power_up_indicator(&mut self.registry, self.projectile_select_display);

        for enemy in &self.curr_data.enemies {
            entities::create_enemy(&mut self.registry, enemy.position, enemy.element, enemy.damage);
        }
        for boss in &self.curr_data.bosses {
            entities::create_boss(
                &mut self.registry,
                boss.position,
                boss.element,
                boss.damage,
                player,
            );
        }

        if let Some(power_up) = saved_power_up {
            *self.registry.power_ups.get_mut(player) = power_up;
        }
        if let Some(projectile_type) = saved_projectile_type {
            let element = projectile_type.element;
            *self.registry.character_projectile_types.get_mut(player) = projectile_type;
            self.registry
                .animations
                .get_mut(self.projectile_select_display)
                .set_state(element.index() as i32);
        }
        if let Some(timer) = saved_win_timer {
            self.registry.win_timers.insert(player, timer);
        }

        if self.curr_level == levels::FINAL_BOSS {
            self.audio.play(AudioCue::BossIntro { final_boss: true });
        } else if is_elemental_boss_level(self.curr_level) {
            self.audio.play(AudioCue::BossIntro { final_boss: false });
        } else {
            self.audio.play(AudioCue::BackgroundMusic);
        }

        if self.curr_level == levels::POWER_UP {
            self.display_power_up();
        }
    }

    /// タイマーとリソースの毎ティック更新
    ///
    /// ワールドが再構築された場合はtrueを返します。
    pub fn step(&mut self, elapsed_ms: f32) -> bool {
        self.update_invulnerable_timers(elapsed_ms);
        self.regenerate_resources(elapsed_ms);
        if self.update_death_timers(elapsed_ms) {
            return true;
        }
        let restarted = self.update_win_timers(elapsed_ms);
        self.maybe_spawn_exit_door();
        restarted
    }

    fn update_invulnerable_timers(&mut self, elapsed_ms: f32) {
        let mut expired = Vec::new();
        for (entity, timer) in self.registry.invulnerable_timers.iter_mut() {
            timer.timer_ms -= elapsed_ms;
            if timer.timer_ms <= 0.0 {
                expired.push(entity);
            }
        }
        for entity in expired {
            self.registry.invulnerable_timers.remove(entity);
        }
    }

    fn regenerate_resources(&mut self, elapsed_ms: f32) {
        for (_, resources) in self.registry.resources.iter_mut() {
            resources.current_mana += elapsed_ms / 1000.0;
            resources.clamp_mana();
            resources.bar_ratio = if resources.max_health > 0.0 {
                resources.current_health / resources.max_health
            } else {
                0.0
            };
            resources.logo_ratio = if resources.max_mana > 0.0 {
                resources.current_mana / resources.max_mana
            } else {
                0.0
            };
        }
    }

    /// 死亡タイマーを進め、満了でワールドを再構築する
    fn update_death_timers(&mut self, elapsed_ms: f32) -> bool {
        if self.registry.death_timers.is_empty() {
            return false;
        }
        let mut min_timer = DeathTimer::DURATION_MS;
        let mut expired = false;
        for (_, timer) in self.registry.death_timers.iter_mut() {
            timer.timer_ms -= elapsed_ms;
            if timer.timer_ms < min_timer {
                min_timer = timer.timer_ms;
            }
            if timer.timer_ms <= 0.0 {
                expired = true;
            }
        }
        if expired {
            self.registry
                .screen_states
                .get_mut(self.screen_state)
                .darken_screen_factor = 0.0;
            self.restart_game();
            return true;
        }
        self.registry
            .screen_states
            .get_mut(self.screen_state)
            .darken_screen_factor = (1.0 - min_timer / DeathTimer::DURATION_MS).clamp(0.0, 1.0);
        false
    }

    /// クリアタイマーを進める
    ///
    /// 正のあいだはスポットライトを縮め、0到達で一度だけレベルを遷移し、
    /// その後は負の領域で再拡大しながら最終的にタイマーを削除します。
    fn update_win_timers(&mut self, elapsed_ms: f32) -> bool {
        if !self.registry.win_timers.has(self.player) {
            return false;
        }
        let timer = self.registry.win_timers.get_mut(self.player);
        timer.timer_ms = timer.timer_ms.min(WinTimer::DURATION_MS);
        timer.timer_ms -= elapsed_ms;
        let timer = timer.clone();

        if timer.timer_ms > 0.0 {
            let screen = self.registry.screen_states.get_mut(self.screen_state);
            screen.apply_spotlight = true;
            screen.spotlight_radius = timer.timer_ms / WinTimer::DURATION_MS;
            false
        } else if !timer.changed_level {
            self.registry
                .win_timers
                .get_mut(self.player)
                .changed_level = true;
            if self.curr_level != levels::POWER_UP {
                // 通常レベルのクリア後はパワーアップ選択を挟む
                self.next_level = self.curr_level + 1;
                self.curr_level = levels::POWER_UP;
            } else {
                self.curr_level = self.next_level;
            }
            self.restart_game();
            true
        } else if timer.timer_ms <= -WinTimer::LINGER_MS {
            self.registry.win_timers.remove(self.player);
            let screen = self.registry.screen_states.get_mut(self.screen_state);
            screen.apply_spotlight = false;
            screen.spotlight_radius = 0.0;
            false
        } else {
            let screen = self.registry.screen_states.get_mut(self.screen_state);
            screen.apply_spotlight = true;
            screen.spotlight_radius = -timer.timer_ms / SPOTLIGHT_EXPAND_DIVISOR;
            false
        }
    }

    /// 全敵撃破後に出口ドアを出現させる
    fn maybe_spawn_exit_door(&mut self) {
        if let Some(door) = self.curr_data.exit_door {
            if self.registry.enemies.is_empty() && self.registry.exit_doors.is_empty() {
                entities::create_exit_door(&mut self.registry, door);
            }
        }
    }

    /// 記録された衝突ペアを解決する
    ///
    /// 死亡中・クリア演出中はペアを読み捨てます。フォロワーの位置同期は
    /// 状態に関わらず毎ティック行います。
    fn handle_collisions(&mut self) {
        let pairs = mem::take(&mut self.registry.collisions);
        if !self.player_is_locked() {
            for (entity, collision) in &pairs {
                self.resolve_pair(*entity, collision);
            }
        }
        self.sync_followers();
    }

    fn player_is_locked(&self) -> bool {
        self.registry.death_timers.has(self.player) || self.registry.win_timers.has(self.player)
    }

    /// 一つの衝突レコードを種別ルールで解決する
    ///
    /// 先行するルールがどちらかのエンティティを破棄していることがあるため、
    /// すべての分岐は存在確認から始まります。
    fn resolve_pair(&mut self, entity: Entity, collision: &Collision) {
        let other = collision.other;
        if !self.registry.positions.has(entity) || !self.registry.positions.has(other) {
            return;
        }

        if self.registry.players.has(entity) {
            if self.registry.enemies.has(other) {
                self.resolve_player_enemy(other);
            } else if self.registry.obstacles.has(other) {
                self.resolve_player_obstacle();
            } else if self.registry.terrain.has(other) {
                self.resolve_terrain_contact(entity, other, collision.displacement, true, false);
            } else if self.registry.exit_doors.has(other) {
                self.win_level();
            }
        } else if self.registry.enemies.has(entity) {
            if self.registry.terrain.has(other) {
                self.resolve_terrain_contact(entity, other, collision.displacement, true, true);
            }
        } else if self.registry.obstacles.has(entity) {
            if self.registry.terrain.has(other) {
                self.resolve_terrain_contact(entity, other, collision.displacement, false, true);
            }
        } else if self.registry.terrain.has(entity) {
            if self.registry.terrain.get(entity).moveable && self.registry.terrain.has(other) {
                self.resolve_terrain_contact(entity, other, collision.displacement, false, true);
            }
        } else if self.registry.projectiles.has(entity) {
            if self.registry.enemies.has(other) {
                self.resolve_projectile_enemy(entity, other);
            } else if self.registry.players.has(other) {
                self.resolve_projectile_player(entity);
            } else if self.registry.power_up_blocks.has(other) {
                self.resolve_projectile_power_up_block(entity, other);
            } else if self.registry.terrain.has(other) {
                self.resolve_projectile_terrain(entity, other);
            }
        }
    }

    fn resolve_player_enemy(&mut self, enemy_entity: Entity) {
        let is_boss = self.registry.bosses.has(enemy_entity);
        let enemy = self.registry.enemies.get_mut(enemy_entity);
        let damage = enemy.damage;
        let cue = if !enemy.is_aggravated {
            enemy.is_aggravated = true;
            is_boss.then(|| AudioCue::BossBattleStart {
                final_boss: enemy.element == ElementType::Combo,
            })
        } else {
            None
        };
        if let Some(cue) = cue {
            self.audio.play(cue);
        }
        self.damage_player(damage);
    }

    /// 障害物との接触。無敵でなければ即死
    fn resolve_player_obstacle(&mut self) {
        if self.registry.invulnerable_timers.has(self.player) {
            return;
        }
        if self.registry.resources.has(self.player) {
            self.registry.resources.get_mut(self.player).current_health = 0.0;
        }
        self.registry.invulnerable_timers.emplace(self.player);
        self.audio.play(AudioCue::ObstacleHit);
        self.kill_player();
    }

    /// 地形接触の物理解決
    ///
    /// スウェプト判定が成立した軸ごとに独立して処理します。
    /// どの軸も成立しない（最初から重なっていた）場合は
    /// 検出時に計算した変位で押し出します。
    fn resolve_terrain_contact(
        &mut self,
        entity: Entity,
        other: Entity,
        displacement: Vec2,
        rollback: bool,
        negate: bool,
    ) {
        let (hit_x, hit_y) = {
            let pos_i = self.registry.positions.get(entity);
            let pos_j = self.registry.positions.get(other);
            (
                collided_left(pos_i, pos_j) || collided_right(pos_i, pos_j),
                collided_top(pos_i, pos_j) || collided_bottom(pos_i, pos_j),
            )
        };

        if rollback {
            let pos = self.registry.positions.get_mut(entity);
            if hit_x {
                pos.position.x = pos.prev_position.x;
            }
            if hit_y {
                pos.position.y = pos.prev_position.y;
            }
            if !hit_x && !hit_y {
                pos.position += displacement;
            }
        }

        // 最初から重なっていた場合は押し出すだけで速度には触れない
        if negate && self.registry.velocities.has(entity) {
            let velocity = self.registry.velocities.get_mut(entity);
            if hit_x {
                velocity.velocity.x = -velocity.velocity.x;
            }
            if hit_y {
                velocity.velocity.y = -velocity.velocity.y;
            }
        }
    }

    fn resolve_projectile_enemy(&mut self, projectile_entity: Entity, enemy_entity: Entity) {
        let projectile = self.registry.projectiles.get(projectile_entity).clone();
        let enemy_element = self.registry.enemies.get(enemy_entity).element;

        if projectile.hostile {
            // 敵の弾は敵を傷つけない。属性の異なる通常敵に当たると
            // 回復させて消費される
            if projectile.element != enemy_element && !self.registry.bosses.has(enemy_entity) {
                if self.registry.resources.has(enemy_entity) {
                    let resources = self.registry.resources.get_mut(enemy_entity);
                    resources.current_health += HOSTILE_PASS_HEAL;
                    resources.clamp_health();
                }
                self.registry
                    .remove_all_components_of_no_collision(projectile_entity);
            }
            return;
        }

        // プレイヤーの弾でもボスは戦闘状態になる
        if self.registry.bosses.has(enemy_entity) {
            let enemy = self.registry.enemies.get_mut(enemy_entity);
            if !enemy.is_aggravated {
                enemy.is_aggravated = true;
                let cue = AudioCue::BossBattleStart {
                    final_boss: enemy.element == ElementType::Combo,
                };
                self.audio.play(cue);
            }
        }

        if !self.registry.resources.has(enemy_entity) {
            self.registry
                .remove_all_components_of_no_collision(projectile_entity);
            return;
        }

        let mut dealt_damage = false;
        {
            let is_weak = is_weak_to(enemy_element, projectile.element);
            let resources = self.registry.resources.get_mut(enemy_entity);
            if projectile.element == enemy_element {
                // 同属性の弾は吸収されて回復になる
                resources.current_health += projectile.damage / 2.0;
            } else {
                let damage = if is_weak {
                    projectile.damage * 3.0
                } else {
                    projectile.damage
                };
                resources.current_health -= damage;
                dealt_damage = true;
            }
            resources.clamp_health();
        }
        if dealt_damage {
            log::debug!("enemy {} hit by {:?} projectile", enemy_entity, projectile.element);
            self.audio.play(AudioCue::DamageTick);
        }
        self.registry
            .remove_all_components_of_no_collision(projectile_entity);

        if self.registry.resources.get(enemy_entity).current_health <= 0.0 {
            self.kill_enemy(enemy_entity);
        }
    }

    /// 敵弾とプレイヤーの接触
    ///
    /// 無敵時間は敵本体・障害物との接触専用で、弾は常に命中し、
    /// 無敵時間を新たに付与することもありません。
    fn resolve_projectile_player(&mut self, projectile_entity: Entity) {
        let projectile = self.registry.projectiles.get(projectile_entity).clone();
        if !projectile.hostile {
            return;
        }
        self.registry
            .remove_all_components_of_no_collision(projectile_entity);
        if !self.registry.resources.has(self.player) {
            return;
        }
        let dead = {
            let resources = self.registry.resources.get_mut(self.player);
            resources.current_health -= projectile.damage;
            resources.clamp_health();
            resources.current_health <= 0.0
        };
        log::debug!("player took {} damage", projectile.damage);
        self.audio.play(AudioCue::DamageTick);
        if dead {
            self.kill_player();
        }
    }

    /// 弾と地形の接触。反射回数が残っていれば進入軸で反射し、
    /// 尽きていれば消滅する
    fn resolve_projectile_terrain(&mut self, projectile_entity: Entity, terrain_entity: Entity) {
        if self.registry.projectiles.get(projectile_entity).bounces <= 0 {
            self.registry
                .remove_all_components_of_no_collision(projectile_entity);
            return;
        }
        self.registry
            .projectiles
            .get_mut(projectile_entity)
            .bounces -= 1;

        let (hit_x, hit_y) = {
            let pos_i = self.registry.positions.get(projectile_entity);
            let pos_j = self.registry.positions.get(terrain_entity);
            (
                collided_left(pos_i, pos_j) || collided_right(pos_i, pos_j),
                collided_top(pos_i, pos_j) || collided_bottom(pos_i, pos_j),
            )
        };
        if self.registry.velocities.has(projectile_entity) {
            let velocity = {
                let velocity = self.registry.velocities.get_mut(projectile_entity);
                if hit_x {
                    velocity.velocity.x = -velocity.velocity.x;
                } else if hit_y {
                    velocity.velocity.y = -velocity.velocity.y;
                }
                velocity.velocity
            };
            self.registry.positions.get_mut(projectile_entity).angle =
                velocity.y.atan2(velocity.x);
        }
    }

    /// 弾とパワーアップブロックの接触
    ///
    /// 選択は常に排他で、新しいブロックを選ぶと以前の選択は解除されます。
    /// すでに選択済みのブロックに当てた場合は弾だけが消えます。
    fn resolve_projectile_power_up_block(&mut self, projectile_entity: Entity, block_entity: Entity) {
        if self.registry.projectiles.get(projectile_entity).hostile {
            return;
        }
        if !self.registry.power_ups.has(self.player) {
            return;
        }
        let kind = self.registry.power_up_blocks.get(block_entity).kind;
        if self.registry.power_ups.get(self.player).is_enabled(kind) {
            self.registry
                .remove_all_components_of_no_collision(projectile_entity);
            return;
        }

        // 以前の選択を解除してブロックを未選択表示へ戻す
        let blocks: Vec<(Entity, PowerUpKind, Option<Entity>)> = self
            .registry
            .power_up_blocks
            .iter()
            .map(|(entity, block)| (entity, block.kind, block.text_entity))
            .collect();
        for (entity, block_kind, text) in blocks {
            if !self.registry.power_ups.get(self.player).is_enabled(block_kind) {
                continue;
            }
            self.registry
                .power_ups
                .get_mut(self.player)
                .set_enabled(block_kind, false);
            if self.registry.animations.has(entity) {
                let animation = self.registry.animations.get_mut(entity);
                animation.state = POWER_UP_BLOCK_ACTIVE;
                animation.is_animating = true;
                animation.rainbow_enabled = true;
            }
            if let Some(text) = text {
                self.registry.remove_all_components_of_no_collision(text);
                self.registry.power_up_blocks.get_mut(entity).text_entity = None;
            }
        }

        self.registry
            .power_ups
            .get_mut(self.player)
            .set_enabled(kind, true);
        let animation = self.registry.animations.get_mut(block_entity);
        animation.state = POWER_UP_BLOCK_INACTIVE;
        animation.is_animating = false;
        animation.rainbow_enabled = false;
        let label = self.registry.power_up_blocks.get(block_entity).label.clone();
        let text = entities::create_text(
            &mut self.registry,
            &format!("You unlocked: {}", label),
            Vec2::new(0.0, 50.0),
            1.0,
            (0.0, 1.0, 0.0),
        );
        self.registry.power_up_blocks.get_mut(block_entity).text_entity = Some(text);
        log::info!("power-up unlocked: {}", label);
        self.audio.play(AudioCue::PowerUpUnlocked);
        self.registry
            .remove_all_components_of_no_collision(projectile_entity);
    }

    /// 無敵時間を考慮してプレイヤーにダメージを与える
    fn damage_player(&mut self, amount: f32) {
        if self.registry.invulnerable_timers.has(self.player) {
            return;
        }
        if !self.registry.resources.has(self.player) {
            return;
        }
        let resources = self.registry.resources.get_mut(self.player);
        resources.current_health -= amount;
        resources.clamp_health();
        let dead = resources.current_health <= 0.0;
        log::debug!("player took {} damage", amount);
        self.audio.play(AudioCue::DamageTick);
        self.registry.invulnerable_timers.emplace(self.player);
        if dead {
            self.kill_player();
        }
    }

    fn kill_player(&mut self) {
        if self.registry.death_timers.has(self.player) {
            return;
        }
        self.registry.death_timers.emplace(self.player);
        if self.registry.velocities.has(self.player) {
            self.registry.velocities.get_mut(self.player).velocity = Vec2::ZERO;
        }
        self.audio.play(AudioCue::PlayerDeath);
    }

    /// 敵を破棄する。体力バーとオーラも道連れにし、
    /// ボスならレベルクリアへ進む
    fn kill_enemy(&mut self, enemy_entity: Entity) {
        let is_boss = self.registry.bosses.has(enemy_entity);
        if let Some(bar) = self.registry.resources.get(enemy_entity).health_bar {
            self.registry.remove_all_components_of_no_collision(bar);
        }
        if is_boss {
            if let Some(aura) = self.registry.bosses.get(enemy_entity).aura {
                self.registry.remove_all_components_of_no_collision(aura);
            }
        }
        self.registry
            .remove_all_components_of_no_collision(enemy_entity);
        log::info!("enemy {} defeated", enemy_entity);
        self.audio.play(AudioCue::EnemyDeath);
        if is_boss {
            self.audio.play(AudioCue::BackgroundMusic);
            self.win_level();
        }
    }

    /// フォロワーをオーナー位置＋オフセットへ同期する
    ///
    /// 二次フォロワーは一次フォロワーの確定後に同期するため、
    /// 同一ティック内で遅延なく追従します。
    fn sync_followers(&mut self) {
        let GameRegistry {
            positions,
            followers,
            secondary_followers,
            ..
        } = &mut self.registry;

        for (entity, follower) in followers.iter() {
            if !positions.has(follower.owner) || !positions.has(entity) {
                continue;
            }
            let owner_position = positions.get(follower.owner).position;
            positions.get_mut(entity).position =
                owner_position + Vec2::new(follower.x_offset, follower.y_offset);
        }
        for (entity, follower) in secondary_followers.iter() {
            if !positions.has(follower.owner) || !positions.has(entity) {
                continue;
            }
            let owner_position = positions.get(follower.owner).position;
            positions.get_mut(entity).position =
                owner_position + Vec2::new(follower.x_offset, follower.y_offset);
        }
    }

    /// パワーアップ選択部屋にブロックを並べる
    ///
    /// 未獲得のパワーアップからランダムに最大3つを提示します。
    /// 提示できるものが残っていなければ部屋を素通りします。
    fn display_power_up(&mut self) {
        let mut available = self.registry.power_ups.get(self.player).available_kinds();
        available.shuffle(&mut self.rng);
        available.truncate(3);

        if available.is_empty() {
            log::info!("all power-ups collected, skipping selection room");
            self.win_level();
            return;
        }
        let xs: &[f32] = match available.len() {
            3 => &[500.0, 700.0, 900.0],
            2 => &[575.0, 825.0],
            _ => &[700.0],
        };
        for (kind, &x) in available.into_iter().zip(xs) {
            entities::create_power_up_block(&mut self.registry, Vec2::new(x, 300.0), kind);
        }
    }
}
