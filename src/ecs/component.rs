use std::collections::HashMap;

use crate::ecs::entity::Entity;

/// コンポーネント型を識別するためのトレイト
pub trait Component: 'static {
    /// コンポーネントの名前を取得
    fn name() -> &'static str
    where
        Self: Sized;
}

/// 特定の型Tに対するコンポーネントストレージ
///
/// エンティティごとに最大一つのコンポーネントを保持します。
/// 格納順（挿入順）は削除後も保たれます。アクセスはO(1)です。
///
/// 契約: `emplace` は重複登録で、`get` / `remove` は未登録でパニックします。
/// これらはルールディスパッチの誤りを示すプログラミングエラーであり、
/// 回復可能なエラーではありません。存在が不確かな場合は `has` で確認します。
pub struct ComponentStore<T: Component> {
    /// エンティティ→インデックスのマッピング
    entities: HashMap<Entity, usize>,
    /// コンポーネントデータとそのエンティティのペア（挿入順）
    data: Vec<(Entity, T)>,
}

impl<T: Component> ComponentStore<T> {
    /// 新しいストレージを作成
    pub fn new() -> Self {
        ComponentStore {
            entities: HashMap::new(),
            data: Vec::new(),
        }
    }

    /// デフォルト値でコンポーネントを登録して可変参照を返す
    ///
    /// すでに同じ型のコンポーネントを持っている場合はパニックします。
    pub fn emplace(&mut self, entity: Entity) -> &mut T
    where
        T: Default,
    {
        self.insert(entity, T::default())
    }

    /// 値を指定してコンポーネントを登録して可変参照を返す
    ///
    /// すでに同じ型のコンポーネントを持っている場合はパニックします。
    pub fn insert(&mut self, entity: Entity, component: T) -> &mut T {
        if self.entities.contains_key(&entity) {
            panic!("{} already present on {}", T::name(), entity);
        }
        let index = self.data.len();
        self.data.push((entity, component));
        self.entities.insert(entity, index);
        &mut self.data[index].1
    }

    /// コンポーネントを取得（未登録の場合はパニック）
    pub fn get(&self, entity: Entity) -> &T {
        match self.entities.get(&entity) {
            Some(&index) => &self.data[index].1,
            None => panic!("{} not present on {}", T::name(), entity),
        }
    }

    /// コンポーネントを可変で取得（未登録の場合はパニック）
    pub fn get_mut(&mut self, entity: Entity) -> &mut T {
        match self.entities.get(&entity) {
            Some(&index) => &mut self.data[index].1,
            None => panic!("{} not present on {}", T::name(), entity),
        }
    }

    /// エンティティがコンポーネントを持っているか確認
    pub fn has(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// コンポーネントを削除して返す（未登録の場合はパニック）
    ///
    /// 挿入順を保つため、削除位置より後ろの要素を前に詰めます。
    pub fn remove(&mut self, entity: Entity) -> T {
        let index = match self.entities.remove(&entity) {
            Some(index) => index,
            None => panic!("{} not present on {}", T::name(), entity),
        };
        let (_, component) = self.data.remove(index);
        // 詰めた分だけインデックスを更新
        for (moved_entity, _) in &self.data[index..] {
            if let Some(i) = self.entities.get_mut(moved_entity) {
                *i -= 1;
            }
        }
        component
    }

    /// 持っている場合のみ削除する（冪等）
    pub fn remove_if_present(&mut self, entity: Entity) -> Option<T> {
        if self.has(entity) {
            Some(self.remove(entity))
        } else {
            None
        }
    }

    /// すべてのコンポーネントとそのエンティティを挿入順で取得
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.data.iter().map(|(e, c)| (*e, c))
    }

    /// すべてのコンポーネントとそのエンティティを挿入順・可変で取得
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.data.iter_mut().map(|(e, c)| (*e, c))
    }

    /// このストレージに格納されているエンティティを挿入順で返す
    pub fn entities(&self) -> Vec<Entity> {
        self.data.iter().map(|(entity, _)| *entity).collect()
    }

    /// 格納数を取得
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// すべてのコンポーネントをクリア
    pub fn clear(&mut self) {
        self.entities.clear();
        self.data.clear();
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Health {
        value: i32,
    }

    impl Component for Health {
        fn name() -> &'static str {
            "Health"
        }
    }

    #[test]
    fn test_emplace_get_has_remove() {
        let mut store = ComponentStore::<Health>::new();
        let entity = Entity::new();

        assert!(!store.has(entity));
        store.emplace(entity).value = 7;
        assert!(store.has(entity));
        assert_eq!(store.get(entity).value, 7);

        let removed = store.remove(entity);
        assert_eq!(removed.value, 7);
        assert!(!store.has(entity));
    }

    #[test]
    #[should_panic(expected = "already present")]
    fn test_double_emplace_panics() {
        let mut store = ComponentStore::<Health>::new();
        let entity = Entity::new();
        store.emplace(entity);
        store.emplace(entity);
    }

    #[test]
    #[should_panic(expected = "not present")]
    fn test_get_missing_panics() {
        let store = ComponentStore::<Health>::new();
        store.get(Entity::new());
    }

    #[test]
    fn test_iteration_order_is_insertion_order() {
        let mut store = ComponentStore::<Health>::new();
        let entities: Vec<Entity> = (0..5).map(|_| Entity::new()).collect();
        for (i, &entity) in entities.iter().enumerate() {
            store.insert(entity, Health { value: i as i32 });
        }

        let order: Vec<Entity> = store.iter().map(|(e, _)| e).collect();
        assert_eq!(order, entities);
    }

    #[test]
    fn test_removal_preserves_order_and_indices() {
        let mut store = ComponentStore::<Health>::new();
        let entities: Vec<Entity> = (0..4).map(|_| Entity::new()).collect();
        for (i, &entity) in entities.iter().enumerate() {
            store.insert(entity, Health { value: i as i32 });
        }

        // 真ん中を削除しても残りの順序とアクセスは保たれる
        store.remove(entities[1]);
        let order: Vec<Entity> = store.iter().map(|(e, _)| e).collect();
        assert_eq!(order, vec![entities[0], entities[2], entities[3]]);
        assert_eq!(store.get(entities[2]).value, 2);
        assert_eq!(store.get(entities[3]).value, 3);
    }

    #[test]
    fn test_remove_if_present_is_idempotent() {
        let mut store = ComponentStore::<Health>::new();
        let entity = Entity::new();
        assert!(store.remove_if_present(entity).is_none());
        store.emplace(entity);
        assert!(store.remove_if_present(entity).is_some());
        assert!(store.remove_if_present(entity).is_none());
    }
}
