use std::fmt;

/// エンティティの一意な識別子
///
/// エンティティ自体はデータを持たず、コンポーネントを少なくとも一つ
/// 持っていることで「存在する」とみなされます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u64);

impl Entity {
    /// 新しいエンティティIDを生成
    pub fn new() -> Self {
        Self(rand::random())
    }

    /// 内部IDを取得
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = Entity::new();
        let b = Entity::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_is_copyable_key() {
        let a = Entity::new();
        let b = a;
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
    }
}
