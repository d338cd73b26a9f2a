//! Mapping Notion objects onto the drink catalog.
//!
//! Pages become [`Drink`]s through their properties; a page's block tree
//! becomes a [`DrinkBody`] by walking it and sorting blocks into sections:
//!
//! - `callout` blocks are notes
//! - `bookmark`, `video` and `image` blocks are references
//! - a heading containing "Forbredelser", "Ingredienser" or "Fremgangsmåte"
//!   claims the blocks after it, up to the next heading
//!
//! Nested children are walked the same way and merged into the result.

use crate::notion::{Block, Database, Page};

use super::schema::{Alcohol, Drink, DrinkBody, DrinksMetainfo};

const ALCOHOL_PROPERTY: &str = "Alkohol";
const TAGS_PROPERTY: &str = "Tags";
const GROUPS_PROPERTY: &str = "Gruppering";

const NOTE_KINDS: [&str; 1] = ["callout"];
const REFERENCE_KINDS: [&str; 3] = ["bookmark", "video", "image"];

/// Heading text that opens a section.
const PREPARATIONS_HEADING: &str = "Forbredelser";
const INGREDIENTS_HEADING: &str = "Ingredienser";
const STEPS_HEADING: &str = "Fremgangsmåte";

/// Something could not be read as part of the catalog.
///
/// Carries every problem found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{subject}: {}", .issues.join("; "))]
pub struct DrinkParseError {
    pub subject: String,
    pub issues: Vec<String>,
}

impl DrinkParseError {
    fn check(subject: String, issues: Vec<String>) -> Result<(), Self> {
        if issues.is_empty() { Ok(()) } else { Err(Self { subject, issues }) }
    }
}

/// Catalog information from the drinks database: the alcohol options.
pub fn parse_drinks_metainfo(database: &Database) -> Result<DrinksMetainfo, DrinkParseError> {
    let Some(options) = database.select_options(ALCOHOL_PROPERTY) else {
        return Err(DrinkParseError {
            subject: format!("database {}", database.id),
            issues: vec![format!("{ALCOHOL_PROPERTY} is not a select property")],
        });
    };

    Ok(DrinksMetainfo {
        alcohols: options.iter().map(|o| Alcohol { title: o.name.clone(), color: o.color.clone() }).collect(),
        last_edited_time: database.last_edited_time,
    })
}

/// Read a drink from its page properties.
pub fn parse_drink(page: &Page) -> Result<Drink, DrinkParseError> {
    let mut issues = Vec::new();

    let title = page.title().filter(|t| !t.trim().is_empty());
    if title.is_none() {
        issues.push("title is missing".to_string());
    }
    let alcohol = page.select(ALCOHOL_PROPERTY);
    if alcohol.is_none() {
        issues.push(format!("{ALCOHOL_PROPERTY} is not set"));
    }
    let tags = page.multi_select(TAGS_PROPERTY);
    if tags.is_none() {
        issues.push(format!("{TAGS_PROPERTY} is not a multi-select property"));
    }
    let groups = page.multi_select(GROUPS_PROPERTY);
    if groups.is_none() {
        issues.push(format!("{GROUPS_PROPERTY} is not a multi-select property"));
    }

    let subject = match &title {
        Some(title) => format!("drink {} ({title})", page.id),
        None => format!("drink {}", page.id),
    };
    let (Some(title), Some(alcohol), Some(tags), Some(groups)) = (title, alcohol, tags, groups) else {
        return Err(DrinkParseError { subject, issues });
    };

    Ok(Drink {
        id: page.id.clone(),
        slug: slug::slugify(&title),
        title,
        illustration_url: page.cover_url().map(str::to_string),
        alcohol: Alcohol { title: alcohol.name.clone(), color: alcohol.color.clone() },
        tags,
        groups,
    })
}

/// Parse every page, keeping the failures apart instead of failing the batch.
pub fn safe_parse_drinks(pages: &[Page]) -> (Vec<Drink>, Vec<DrinkParseError>) {
    let mut drinks = Vec::with_capacity(pages.len());
    let mut failed = Vec::new();
    for page in pages {
        match parse_drink(page) {
            Ok(drink) => drinks.push(drink),
            Err(e) => failed.push(e),
        }
    }
    (drinks, failed)
}

/// Sections found so far; `None` means never seen.
#[derive(Debug, Default)]
struct Sections {
    preparations: Option<Vec<Block>>,
    ingredients: Option<Vec<Block>>,
    steps: Option<Vec<Block>>,
    notes: Option<Vec<Block>>,
    references: Option<Vec<Block>>,
}

impl Sections {
    /// Fold in the sections found among a block's children.
    ///
    /// Notes and references accumulate; a section found below replaces the
    /// one found above.
    fn merge(&mut self, nested: Sections) {
        let mut notes = self.notes.take().unwrap_or_default();
        notes.extend(nested.notes.unwrap_or_default());
        self.notes = Some(notes);

        let mut references = self.references.take().unwrap_or_default();
        references.extend(nested.references.unwrap_or_default());
        self.references = Some(references);

        if nested.preparations.is_some() {
            self.preparations = nested.preparations;
        }
        if nested.ingredients.is_some() {
            self.ingredients = nested.ingredients;
        }
        if nested.steps.is_some() {
            self.steps = nested.steps;
        }
    }
}

fn collect_sections(blocks: &[Block]) -> Sections {
    let mut sections = Sections::default();
    let mut i = 0;

    while i < blocks.len() {
        let block = &blocks[i];
        i += 1;

        if NOTE_KINDS.contains(&block.kind.as_str()) {
            sections.notes.get_or_insert_with(Vec::new).push(block.clone());
            continue;
        }

        if REFERENCE_KINDS.contains(&block.kind.as_str()) {
            sections.references.get_or_insert_with(Vec::new).push(block.clone());
            continue;
        }

        if block.is_heading() {
            let text = block.text();
            let targets = [
                (PREPARATIONS_HEADING, &mut sections.preparations),
                (INGREDIENTS_HEADING, &mut sections.ingredients),
                (STEPS_HEADING, &mut sections.steps),
            ];

            // The first matching section takes the blocks; later matches in
            // the same heading are left with nothing to take.
            for (_, target) in targets.into_iter().filter(|(heading, _)| text.contains(heading)) {
                let end = blocks[i..].iter().position(Block::is_heading).map_or(blocks.len(), |n| i + n);
                *target = Some(blocks[i..end].to_vec());
                i = end;
            }
        }

        if !block.children.is_empty() {
            sections.merge(collect_sections(&block.children));
        }
    }

    sections
}

/// Split a recipe page's blocks into a [`DrinkBody`].
///
/// Ingredients, steps and references are required. Blocks Notion cannot
/// represent through the API (`unsupported`) are rejected.
pub fn parse_drink_body(blocks: &[Block]) -> Result<DrinkBody, DrinkParseError> {
    let sections = collect_sections(blocks);
    let mut issues = Vec::new();

    for (name, section) in [
        ("preparations", &sections.preparations),
        ("ingredients", &sections.ingredients),
        ("steps", &sections.steps),
        ("notes", &sections.notes),
        ("references", &sections.references),
    ] {
        for block in section.iter().flatten().filter(|b| b.kind == "unsupported") {
            issues.push(format!("unsupported block {} in {name}", block.id));
        }
    }
    for (name, section) in [
        ("ingredients", &sections.ingredients),
        ("steps", &sections.steps),
        ("references", &sections.references),
    ] {
        if section.is_none() {
            issues.push(format!("{name} is missing"));
        }
    }

    DrinkParseError::check("drink body".into(), issues)?;

    let Sections { preparations, ingredients: Some(ingredients), steps: Some(steps), notes, references: Some(references) } =
        sections
    else {
        return Err(DrinkParseError { subject: "drink body".into(), issues: vec!["incomplete sections".into()] });
    };
    Ok(DrinkBody { preparations, ingredients, steps, notes, references })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{block, drink_body_blocks, drink_page, drinks_database, heading, with_children};

    fn ids(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_parse_drinks_metainfo() {
        let db = drinks_database("db", &[("Gin", "blue"), ("Rum", "brown")]);
        let meta = parse_drinks_metainfo(&db).unwrap();
        assert_eq!(meta.alcohols, vec![
            Alcohol { title: "Gin".into(), color: "blue".into() },
            Alcohol { title: "Rum".into(), color: "brown".into() },
        ]);
        assert_eq!(meta.last_edited_time, db.last_edited_time);
    }

    #[test]
    fn test_parse_drinks_metainfo_without_alcohol_select() {
        let mut db = drinks_database("db", &[]);
        db.properties.remove("Alkohol");
        let err = parse_drinks_metainfo(&db).unwrap_err();
        assert!(err.to_string().contains("Alkohol"));
    }

    #[test]
    fn test_parse_drink() {
        let page = drink_page("d1", "Gin & Tonic", Some(("Gin", "blue")), &["Frisk", "Enkel"]);
        let drink = parse_drink(&page).unwrap();
        assert_eq!(drink.id, "d1");
        assert_eq!(drink.title, "Gin & Tonic");
        assert_eq!(drink.slug, "gin-tonic");
        assert_eq!(drink.illustration_url.as_deref(), Some("https://img.example/d1.png"));
        assert_eq!(drink.alcohol, Alcohol { title: "Gin".into(), color: "blue".into() });
        assert_eq!(drink.tags, vec!["Frisk".to_string(), "Enkel".to_string()]);
        assert_eq!(drink.groups, vec!["Klassikere".to_string()]);
    }

    #[test]
    fn test_parse_drink_reports_every_issue() {
        let mut page = drink_page("d2", "", None, &[]);
        page.properties.remove("Gruppering");
        let err = parse_drink(&page).unwrap_err();
        assert_eq!(err.subject, "drink d2");
        assert_eq!(err.issues.len(), 3);
    }

    #[test]
    fn test_safe_parse_drinks_keeps_good_pages() {
        let pages = vec![
            drink_page("d1", "Negroni", Some(("Gin", "blue")), &[]),
            drink_page("d2", "Mystery", None, &[]),
            drink_page("d3", "Mojito", Some(("Rum", "brown")), &[]),
        ];
        let (drinks, failed) = safe_parse_drinks(&pages);
        assert_eq!(drinks.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["d1", "d3"]);
        assert_eq!(failed.len(), 1);
        assert!(failed[0].subject.contains("Mystery"));
    }

    #[test]
    fn test_parse_drink_body_sections() {
        let body = parse_drink_body(&drink_body_blocks("n")).unwrap();
        assert_eq!(ids(body.preparations.as_deref().unwrap()), vec!["n-p1"]);
        assert_eq!(ids(&body.ingredients), vec!["n-i1", "n-i2"]);
        assert_eq!(ids(&body.steps), vec!["n-s1"]);
        assert_eq!(ids(body.notes.as_deref().unwrap()), vec!["n-c1"]);
        assert_eq!(ids(&body.references), vec!["n-r1"]);
    }

    #[test]
    fn test_section_stops_at_next_heading() {
        let blocks = vec![
            block("r0", "bookmark", ""),
            heading("h1", "Ingredienser"),
            block("i1", "bulleted_list_item", "gin"),
            heading("h2", "Historikk"),
            block("x1", "paragraph", "not an ingredient"),
            heading("h3", "Fremgangsmåte"),
            block("s1", "paragraph", "stir"),
            block("r1", "video", ""),
        ];
        let body = parse_drink_body(&blocks).unwrap();
        assert_eq!(ids(&body.ingredients), vec!["i1"]);
        // everything up to the next heading belongs to the section, references included
        assert_eq!(ids(&body.steps), vec!["s1", "r1"]);
        assert_eq!(ids(&body.references), vec!["r0"]);
    }

    #[test]
    fn test_nested_sections_are_merged() {
        let blocks = vec![
            block("c1", "callout", "top note"),
            with_children(block("t1", "toggle", "Oppskrift"), vec![
                heading("h1", "Ingredienser"),
                block("i1", "bulleted_list_item", "rum"),
                heading("h2", "Fremgangsmåte"),
                block("s1", "numbered_list_item", "shake"),
                block("c2", "callout", "nested note"),
            ]),
            block("r1", "image", ""),
        ];
        let body = parse_drink_body(&blocks).unwrap();
        assert_eq!(ids(&body.ingredients), vec!["i1"]);
        assert_eq!(ids(&body.steps), vec!["s1", "c2"]);
        assert_eq!(ids(body.notes.as_deref().unwrap()), vec!["c1"]);
        assert_eq!(ids(&body.references), vec!["r1"]);
        assert!(body.preparations.is_none());
    }

    #[test]
    fn test_nested_section_replaces_outer_one() {
        let blocks = vec![
            heading("h1", "Ingredienser"),
            block("i1", "bulleted_list_item", "outer"),
            with_children(heading("h2", "Fremgangsmåte"), vec![
                heading("h3", "Ingredienser"),
                block("i2", "bulleted_list_item", "inner"),
            ]),
            block("s1", "paragraph", "stir"),
            block("r1", "bookmark", ""),
        ];
        let body = parse_drink_body(&blocks).unwrap();
        assert_eq!(ids(&body.ingredients), vec!["i2"]);
        assert_eq!(ids(&body.steps), vec!["s1", "r1"]);
    }

    #[test]
    fn test_heading_naming_two_sections() {
        let blocks = vec![
            heading("h1", "Forbredelser og Ingredienser"),
            block("p1", "paragraph", "kjøl glasset"),
            block("i1", "bulleted_list_item", "gin"),
            heading("h2", "Fremgangsmåte"),
            block("s1", "paragraph", "rør"),
            heading("h3", "Referanser"),
            block("r1", "bookmark", ""),
        ];
        let body = parse_drink_body(&blocks).unwrap();
        assert_eq!(ids(body.preparations.as_deref().unwrap()), vec!["p1", "i1"]);
        assert!(body.ingredients.is_empty());
        assert_eq!(ids(&body.steps), vec!["s1"]);
    }

    #[test]
    fn test_missing_sections_are_reported() {
        let blocks = vec![heading("h1", "Ingredienser"), block("i1", "bulleted_list_item", "gin")];
        let err = parse_drink_body(&blocks).unwrap_err();
        assert_eq!(err.issues, vec!["steps is missing".to_string(), "references is missing".to_string()]);
    }

    #[test]
    fn test_unsupported_blocks_are_rejected() {
        let mut blocks = drink_body_blocks("u");
        blocks.insert(4, block("bad", "unsupported", ""));
        let err = parse_drink_body(&blocks).unwrap_err();
        assert_eq!(err.issues, vec!["unsupported block bad in ingredients".to_string()]);
    }
}
