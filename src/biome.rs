// ============================================
// src/biome.rs
// バイオーム（出題セットの種類）
// ============================================

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 出題セットの種類。どの家リストを読むか、作業台を聞くかが決まる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biome {
    Plains,
    Desert,
    Savanna,
    Taiga,
    Snowy,
}

/// 切り替えタブの並び順
pub const BIOMES: [Biome; 5] = [
    Biome::Plains,
    Biome::Desert,
    Biome::Savanna,
    Biome::Taiga,
    Biome::Snowy,
];

impl Biome {
    /// データファイル名などに使う小文字の名前
    pub fn key(self) -> &'static str {
        match self {
            Biome::Plains => "plains",
            Biome::Desert => "desert",
            Biome::Savanna => "savanna",
            Biome::Taiga => "taiga",
            Biome::Snowy => "snowy",
        }
    }

    /// 表示用（先頭だけ大文字）
    pub fn display_name(self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// 作業台の有無を聞くのは砂漠だけ
    pub fn needs_craft(self) -> bool {
        self == Biome::Desert
    }

    /// タブ上の位置
    pub fn index(self) -> usize {
        BIOMES.iter().position(|b| *b == self).unwrap_or(0)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown biome `{0}`")]
pub struct UnknownBiome(pub String);

impl FromStr for Biome {
    type Err = UnknownBiome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BIOMES
            .iter()
            .copied()
            .find(|b| b.key() == s)
            .ok_or_else(|| UnknownBiome(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_key() {
        for biome in BIOMES {
            assert_eq!(biome.key().parse::<Biome>(), Ok(biome));
        }
    }

    #[test]
    fn rejects_unknown_and_miscased_names() {
        assert!("lava".parse::<Biome>().is_err());
        assert!("Plains".parse::<Biome>().is_err());
        assert!("".parse::<Biome>().is_err());
    }

    #[test]
    fn only_desert_needs_craft() {
        let with_craft: Vec<_> = BIOMES.iter().filter(|b| b.needs_craft()).collect();
        assert_eq!(with_craft, vec![&Biome::Desert]);
    }

    #[test]
    fn display_name_is_capitalized() {
        assert_eq!(Biome::Savanna.display_name(), "Savanna");
        assert_eq!(Biome::Snowy.index(), 4);
    }
}
