use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::IdentifierCategory;

const PHONE_COUNTRY_CODES: &str = "1|44|91|61|86|49|33|81|82|55|52|34|39|31|46|47|45|43|41|48|351|353|358|372|371|370|375|380|996|995|994|993|992|976|975|974|973|972|971|968|967|966|965|964|963|962|961|880|855|856|95|94|93|92|91|90|98|20|27|234|233|232|231|225|224|223|221|220|218|213|212|211|98|971|966|965|964|963|962|961|968|967|972|973|974|975|976|977|94|93|92|91|90|81|82|86|852|853|886|65|60|63|62|84|855|856|95|673|674|675|676|679|680|685|689|682|683|686|687|689|690|691|692|699|670|672|673|674|675|676|677|678|679|680|681|682|683|684|685|686|687|688|689|690|691|692|693|694|695|696|697|698|699";

/// Ordered pattern sources per category. Rules run in order and their
/// candidates are merged first-seen.
fn rule_sources(category: IdentifierCategory) -> Vec<String> {
    let rules: Vec<&str> = match category {
        IdentifierCategory::Email => {
            vec![r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"]
        }
        IdentifierCategory::Twitter => vec![
            r"(?:https?://(?:www\.)?(?:twitter\.com|x\.com)/([A-Za-z0-9_]{1,15})|@([A-Za-z0-9_]{1,15}))\b",
            r"twitter\.com/([A-Za-z0-9_]{1,15})",
        ],
        IdentifierCategory::Instagram => vec![
            r"(?:https?://(?:www\.)?instagram\.com/([A-Za-z0-9_.]{1,30})|@([A-Za-z0-9_.]{1,30}))\b",
            r"instagram\.com/([A-Za-z0-9_.]{1,30})",
        ],
        IdentifierCategory::Facebook => vec![
            r"(?:https?://(?:www\.)?facebook\.com/(?:pages/|profile\.php\?id=)?([A-Za-z0-9_.-]+)|fb\.com/([A-Za-z0-9_.-]+))",
            r"facebook\.com/groups/([A-Za-z0-9_.-]+)",
        ],
        IdentifierCategory::Tiktok => vec![
            r"(?:https?://(?:www\.)?tiktok\.com/@?([A-Za-z0-9_.]{1,24})|@([A-Za-z0-9_.]{1,24}))\b",
            r"tiktok\.com/@?([A-Za-z0-9_.]{1,24})",
        ],
        IdentifierCategory::Discord => vec![
            r"(?:discord\.gg/([\w-]+)|discordapp\.com/invite/([\w-]+)|discord\.com/invite/([\w-]+))",
            r"discord\.gg/([\w-]+)",
        ],
        IdentifierCategory::Telegram => vec![
            r"(?:t\.me/|telegram\.me/|telegram\.dog/)([A-Za-z0-9_]{5,32})",
            r"t\.me/([A-Za-z0-9_]{5,32})",
        ],
        IdentifierCategory::Website => vec![
            r"https?://(?:www\.)?([A-Za-z0-9_.-]+\.[A-Za-z]{2,})(?:/[A-Za-z0-9_.-]*)?",
            r"(?:www\.)?([A-Za-z0-9_.-]+\.[A-Za-z]{2,})",
        ],
        IdentifierCategory::Phone => {
            return vec![
                format!(
                    r"(?:\+?(?:{})\s?)?[-.\s]?\(?\d{{3}}\)?[-.\s]?\d{{3}}[-.\s]?\d{{4}}",
                    PHONE_COUNTRY_CODES
                ),
                r"(?:\+?\d{1,3}[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4})".to_string(),
            ];
        }
        IdentifierCategory::Linkedin => vec![
            r"(?:https?://(?:www\.)?linkedin\.com/(?:in/|company/)([A-Za-z0-9_-]+))",
            r"linkedin\.com/(?:in/|company/)([A-Za-z0-9_-]+)",
        ],
        IdentifierCategory::Youtube => vec![
            r"(?:https?://(?:www\.)?youtube\.com/(?:channel/|c/|user/|@)([A-Za-z0-9_-]+))",
            r"youtube\.com/(?:channel/|c/|user/|@)([A-Za-z0-9_-]+)",
        ],
        IdentifierCategory::Reddit => vec![
            r"(?:https?://(?:www\.)?reddit\.com/(?:u/|user/|r/)([A-Za-z0-9_-]+))",
            r"reddit\.com/(?:u/|user/|r/)([A-Za-z0-9_-]+)",
        ],
        IdentifierCategory::Twitch => vec![
            r"(?:https?://(?:www\.)?twitch\.tv/([A-Za-z0-9_]+))",
            r"twitch\.tv/([A-Za-z0-9_]+)",
        ],
        IdentifierCategory::Snapchat => vec![
            r"(?:https?://(?:www\.)?snapchat\.com/add/([A-Za-z0-9_.-]+))",
            r"snapchat\.com/add/([A-Za-z0-9_.-]+)",
        ],
        // The first rule has no capture group and yields the full profile URL.
        IdentifierCategory::Pinterest => vec![
            r"(?:https?://(?:www\.)?pinterest\.(?:com|co\.uk|fr|de|it|es)/(?:[A-Za-z0-9_.-]+))",
            r"pinterest\.(?:com|co\.uk|fr|de|it|es)/([A-Za-z0-9_.-]+)",
        ],
        IdentifierCategory::Github => vec![
            r"(?:https?://(?:www\.)?github\.com/([A-Za-z0-9_.-]+)(?:/[A-Za-z0-9_.-]+)?)",
            r"github\.com/([A-Za-z0-9_.-]+)(?:/[A-Za-z0-9_.-]+)?",
        ],
    };
    rules.into_iter().map(str::to_string).collect()
}

#[derive(Debug)]
pub struct PatternRule {
    regex: Regex,
}

impl PatternRule {
    fn compile(source: &str) -> Option<Self> {
        Regex::new(source).ok().map(|regex| Self { regex })
    }

    /// Raw candidates in match order. Rules with capture groups yield each
    /// participating group; rules without groups yield the whole match.
    pub fn candidates<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut out = Vec::new();
        let group_count = self.regex.captures_len();
        for caps in self.regex.captures_iter(text) {
            if group_count <= 1 {
                if let Some(whole) = caps.get(0) {
                    out.push(whole.as_str());
                }
                continue;
            }
            for idx in 1..group_count {
                if let Some(group) = caps.get(idx) {
                    out.push(group.as_str());
                }
            }
        }
        out
    }
}

pub struct RuleTable {
    entries: Vec<(IdentifierCategory, Vec<PatternRule>)>,
}

impl RuleTable {
    fn build() -> Self {
        let entries = IdentifierCategory::all()
            .iter()
            .map(|category| {
                let rules = rule_sources(*category)
                    .iter()
                    .filter_map(|source| PatternRule::compile(source))
                    .collect();
                (*category, rules)
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (IdentifierCategory, &[PatternRule])> {
        self.entries
            .iter()
            .map(|(category, rules)| (*category, rules.as_slice()))
    }

    pub fn rules_for(&self, category: IdentifierCategory) -> &[PatternRule] {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or(&[])
    }
}

pub static RULES: Lazy<RuleTable> = Lazy::new(RuleTable::build);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_compiles() {
        for category in IdentifierCategory::all() {
            let sources = rule_sources(*category);
            assert!(!sources.is_empty());
            assert_eq!(RULES.rules_for(*category).len(), sources.len(), "{}", category.as_str());
        }
    }

    #[test]
    fn grouped_rule_skips_unmatched_groups() {
        let rule = PatternRule::compile(r"(?:a(\d)|b(\d))").unwrap();
        assert_eq!(rule.candidates("a1 b2"), vec!["1", "2"]);
    }

    #[test]
    fn ungrouped_rule_yields_whole_match() {
        let rule = PatternRule::compile(r"(?:ab)+").unwrap();
        assert_eq!(rule.candidates("abab x ab"), vec!["abab", "ab"]);
    }
}
