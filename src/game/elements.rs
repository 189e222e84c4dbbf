//! エレメント属性モジュール
//!
//! 敵と弾が持つエレメント属性と、属性間の相性（弱点）を定義します。

use serde::{Deserialize, Serialize};

/// エレメント属性
///
/// `Combo` は最終ボス専用の複合属性で、通常の相性計算には登場しません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Water,
    Fire,
    Earth,
    Lightning,
    Combo,
}

impl ElementType {
    /// 四属性（Comboを除く）
    pub const BASIC: [ElementType; 4] = [
        ElementType::Water,
        ElementType::Fire,
        ElementType::Earth,
        ElementType::Lightning,
    ];

    /// パワーアップ配列用のインデックス
    ///
    /// Comboはパワーアップの対象外なのでパニックします。
    pub fn index(self) -> usize {
        match self {
            ElementType::Water => 0,
            ElementType::Fire => 1,
            ElementType::Earth => 2,
            ElementType::Lightning => 3,
            ElementType::Combo => panic!("Combo element has no power-up slot"),
        }
    }

    /// 表示名
    pub fn label(self) -> &'static str {
        match self {
            ElementType::Water => "Water",
            ElementType::Fire => "Fire",
            ElementType::Earth => "Earth",
            ElementType::Lightning => "Lightning",
            ElementType::Combo => "Combo",
        }
    }
}

impl Default for ElementType {
    fn default() -> Self {
        ElementType::Water
    }
}

/// `target` 属性が `attacker` 属性に対して弱点かどうか
///
/// 相性は循環する固定関数で、各属性はちょうど一つの属性に強い:
/// Water → Fire → Earth → Lightning → Water
pub fn is_weak_to(target: ElementType, attacker: ElementType) -> bool {
    matches!(
        (target, attacker),
        (ElementType::Fire, ElementType::Water)
            | (ElementType::Earth, ElementType::Fire)
            | (ElementType::Lightning, ElementType::Earth)
            | (ElementType::Water, ElementType::Lightning)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weakness_cycle() {
        assert!(is_weak_to(ElementType::Fire, ElementType::Water));
        assert!(is_weak_to(ElementType::Earth, ElementType::Fire));
        assert!(is_weak_to(ElementType::Lightning, ElementType::Earth));
        assert!(is_weak_to(ElementType::Water, ElementType::Lightning));
    }

    #[test]
    fn test_each_element_is_strong_against_exactly_one() {
        for attacker in ElementType::BASIC {
            let beaten = ElementType::BASIC
                .iter()
                .filter(|&&target| is_weak_to(target, attacker))
                .count();
            assert_eq!(beaten, 1);
        }
    }

    #[test]
    fn test_same_element_is_not_a_weakness() {
        for element in ElementType::BASIC {
            assert!(!is_weak_to(element, element));
        }
    }
}
