//! Cheating-reason heuristic for ban reasons.

use aho_corasick::AhoCorasick;

/// Case-insensitive multilingual substring matcher over ban reasons.
#[derive(Debug, Clone)]
pub struct CheaterKeywords {
    matcher: Option<AhoCorasick>,
}

impl CheaterKeywords {
    /// Build from a keyword list. Empty entries are ignored; an empty list
    /// matches nothing.
    pub fn new<I, S>(keywords: I) -> Result<Self, aho_corasick::BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let matcher = if patterns.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&patterns)?)
        };
        Ok(Self { matcher })
    }

    /// True if the reason mentions any keyword.
    pub fn matches(&self, reason: &str) -> bool {
        match &self.matcher {
            Some(m) => m.is_match(&reason.to_lowercase()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_cheater_keywords;

    #[test]
    fn test_default_keywords_cover_languages() {
        let kw = CheaterKeywords::new(default_cheater_keywords()).unwrap();
        assert!(kw.matches("Cheating"));
        assert!(kw.matches("AIMBOT detected by admin"));
        assert!(kw.matches("Betrug / Wallhack"));
        assert!(kw.matches("Tricheur"));
        assert!(kw.matches("ЧИТЕР"));
        assert!(kw.matches("使用外挂"));
        assert!(!kw.matches("Teamkilling"));
        assert!(!kw.matches("Toxic behaviour"));
    }

    #[test]
    fn test_default_keywords_skip_ordinary_words() {
        let kw = CheaterKeywords::new(default_cheater_keywords()).unwrap();
        assert!(!kw.matches("Не читает правила сервера"));
        assert!(!kw.matches("Не учитывает приказы SL"));
        assert!(!kw.matches("Whacking teammates with shovel"));
        assert!(kw.matches("Whacking teammates with aimbot"));
    }

    #[test]
    fn test_custom_and_empty_lists() {
        let kw = CheaterKeywords::new(["  Exploit ", ""]).unwrap();
        assert!(kw.matches("map exploit abuse"));
        assert!(!kw.matches("cheating"));

        let none = CheaterKeywords::new(Vec::<String>::new()).unwrap();
        assert!(!none.matches("cheating"));
    }
}
