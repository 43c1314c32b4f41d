use crate::query::sentiment_name;
use colored::{ColoredString, Colorize};
use rand::seq::SliceRandom;
use rand::Rng;
use repustate_protocol::{Entity, IndexResult, SearchResult};
use std::collections::BTreeSet;
use std::io::{self, Write};

pub fn notice(msg: &str) -> ColoredString {
    msg.blue()
}

pub fn failure(msg: &str) -> ColoredString {
    msg.red()
}

pub fn set_color(enabled: bool) {
    if !enabled {
        colored::control::set_override(false);
    }
}

pub fn write_search_result<W: Write + ?Sized>(out: &mut W, res: &SearchResult) -> io::Result<()> {
    writeln!(out, "Found {} results:", res.total)?;
    for doc in &res.documents {
        writeln!(out, "---")?;
        writeln!(out, "Text: {:?}", doc.text)?;
        writeln!(out, "Entities:")?;
        for entity in &doc.entities {
            writeln!(out, "{:?} ({})", entity.title, entity.classifications.join(", "))?;
        }
    }
    Ok(())
}

/// Distinct classifications across all entities, sorted.
pub fn classifications(entities: &[Entity]) -> Vec<String> {
    entities
        .iter()
        .flat_map(|e| e.classifications.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn write_index_result<W, R>(
    out: &mut W,
    res: &IndexResult,
    search_cmd: &str,
    rng: &mut R,
) -> io::Result<()>
where
    W: Write + ?Sized,
    R: Rng + ?Sized,
{
    writeln!(out, "{}", notice("Document successfully indexed."))?;

    if res.themes.is_empty() {
        writeln!(out, "No themes detected.")?;
    } else {
        writeln!(out, "Themes:")?;
        for theme in &res.themes {
            writeln!(out, "- {}", theme)?;
        }
    }

    let sentiment = (!res.sentiment.is_empty()).then(|| sentiment_name(&res.sentiment));
    match sentiment {
        Some(name) => writeln!(out, "Sentiment:\n- {}", name)?,
        None => writeln!(out, "No sentiment detected.")?,
    }

    let classes = classifications(&res.entities);
    if classes.is_empty() {
        writeln!(out, "No classifications found.")?;
    } else {
        writeln!(out, "Classifications:")?;
        for class in &classes {
            writeln!(out, "- {}", class)?;
        }
    }

    let hints = search_hints(&res.themes, sentiment, &classes, rng);
    if !hints.is_empty() {
        let hints: Vec<String> = hints
            .iter()
            .map(|args| format!("`{} {}`", search_cmd, args.join(" ")))
            .collect();
        writeln!(out)?;
        writeln!(out, "Now try: {}", hints.join(", "))?;
    }
    Ok(())
}

/// Example searches built from what the server detected in a document.
pub fn search_hints<R: Rng + ?Sized>(
    themes: &[String],
    sentiment: Option<&str>,
    classes: &[String],
    rng: &mut R,
) -> Vec<Vec<String>> {
    let mut hints = Vec::new();
    let sent: Vec<String> = sentiment.map(str::to_string).into_iter().collect();

    if let Some(class) = classes.choose(rng) {
        hints.push(vec![class.clone()]);
    }
    if let Some(theme) = themes.choose(rng) {
        hints.push([sent.clone(), vec![theme.clone()]].concat());
    }
    if !themes.is_empty() && !classes.is_empty() {
        if let (Some(theme), Some(class)) = (themes.choose(rng), classes.choose(rng)) {
            hints.push([sent.clone(), vec![theme.clone(), class.clone()]].concat());
        }
    }
    if hints.is_empty() && !sent.is_empty() {
        hints.push(sent);
    }

    hints
}

pub fn write_terms<W: Write + ?Sized>(out: &mut W, terms: &[&str]) -> io::Result<()> {
    for term in terms {
        writeln!(out, "{}", term)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entity(title: &str, classes: &[&str]) -> Entity {
        Entity {
            title: title.to_string(),
            classifications: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_write_search_result() {
        colored::control::set_override(false);
        let res = SearchResult {
            total: 1,
            documents: vec![repustate_protocol::Document {
                text: "Paris is the capital of France.".to_string(),
                entities: vec![entity("Paris", &["Location.city", "Location.capital"])],
            }],
        };

        let mut out = Vec::<u8>::new();
        write_search_result(&mut out, &res).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Found 1 results:\n---\nText: \"Paris is the capital of France.\"\nEntities:\n\"Paris\" (Location.city, Location.capital)\n"
        );
    }

    #[test]
    fn test_classifications_are_distinct_and_sorted() {
        let entities = vec![
            entity("Paris", &["Location.city", "Location.capital"]),
            entity("Lyon", &["Location.city"]),
        ];
        assert_eq!(
            classifications(&entities),
            strings(&["Location.capital", "Location.city"])
        );
    }

    #[test]
    fn test_search_hints_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let themes = strings(&["sports"]);
        let classes = strings(&["Location.city"]);

        let hints = search_hints(&themes, Some("positive"), &classes, &mut rng);
        assert_eq!(
            hints,
            vec![
                strings(&["Location.city"]),
                strings(&["positive", "sports"]),
                strings(&["positive", "sports", "Location.city"]),
            ]
        );
    }

    #[test]
    fn test_search_hints_picks_from_inputs() {
        let mut rng = StdRng::seed_from_u64(42);
        let themes = strings(&["sports", "music", "food"]);
        let hints = search_hints(&themes, None, &[], &mut rng);

        assert_eq!(hints.len(), 1);
        assert!(themes.contains(&hints[0][0]));
    }

    #[test]
    fn test_search_hints_fallback() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            search_hints(&[], Some("neutral"), &[], &mut rng),
            vec![strings(&["neutral"])]
        );
        assert!(search_hints(&[], None, &[], &mut rng).is_empty());
    }

    #[test]
    fn test_write_index_result() {
        colored::control::set_override(false);
        let res = IndexResult {
            themes: strings(&["weather"]),
            sentiment: "pos".to_string(),
            entities: vec![entity("London", &["Location.city"])],
        };

        let mut out = Vec::<u8>::new();
        let mut rng = StdRng::seed_from_u64(3);
        write_index_result(&mut out, &res, "rcli search", &mut rng).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Document successfully indexed.\nThemes:\n- weather\n"));
        assert!(text.contains("Sentiment:\n- positive\n"));
        assert!(text.contains("Classifications:\n- Location.city\n"));
        assert!(text.contains(
            "Now try: `rcli search Location.city`, `rcli search positive weather`, `rcli search positive weather Location.city`"
        ));
    }

    #[test]
    fn test_write_index_result_nothing_detected() {
        colored::control::set_override(false);
        let mut out = Vec::<u8>::new();
        let mut rng = StdRng::seed_from_u64(3);
        write_index_result(&mut out, &IndexResult::default(), "search", &mut rng).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("No themes detected."));
        assert!(text.contains("No sentiment detected."));
        assert!(text.contains("No classifications found."));
        assert!(!text.contains("Now try"));
    }
}
