//! The drink catalog on top of a Notion database.
//!
//! Bulk operations tolerate bad rows: a page or body that cannot be parsed
//! is logged and left out, the rest of the batch is returned.

pub mod parser;
pub mod schema;

pub use parser::{DrinkParseError, parse_drink, parse_drink_body, parse_drinks_metainfo, safe_parse_drinks};
pub use schema::{Alcohol, Drink, DrinkBody, DrinkWithBody, DrinksAndMetainfo, DrinksMetainfo};

use std::sync::Arc;

use dranks_core::Error;

use crate::notion::NotionApi;

impl From<DrinkParseError> for Error {
    fn from(err: DrinkParseError) -> Self {
        Error::ParseFailed(err.to_string())
    }
}

/// Reads drinks from one Notion database.
#[derive(Clone)]
pub struct DrinksClient {
    api: Arc<dyn NotionApi>,
    database_id: String,
}

impl std::fmt::Debug for DrinksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrinksClient").field("database_id", &self.database_id).finish_non_exhaustive()
    }
}

impl DrinksClient {
    pub fn new(api: Arc<dyn NotionApi>, database_id: impl Into<String>) -> Self {
        Self { api, database_id: database_id.into() }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub async fn get_drinks_metainfo(&self) -> Result<DrinksMetainfo, Error> {
        let database = self.api.get_database(&self.database_id).await?;
        Ok(parse_drinks_metainfo(&database)?)
    }

    /// Every drink that parses; the others are logged and skipped.
    pub async fn get_drinks(&self) -> Result<Vec<Drink>, Error> {
        let pages = self.api.get_database_pages(&self.database_id).await?;
        let (drinks, unparsed) = safe_parse_drinks(&pages);
        for failure in &unparsed {
            tracing::warn!(error = %failure, "skipping drink that failed to parse");
        }
        if !unparsed.is_empty() {
            tracing::warn!(parsed = drinks.len(), failed = unparsed.len(), "some drinks failed to parse");
        }
        Ok(drinks)
    }

    /// Drinks plus metainfo, with the alcohols narrowed to those in use.
    pub async fn get_drinks_and_metainfo(&self) -> Result<DrinksAndMetainfo, Error> {
        let (drinks, mut drinks_metainfo) = futures::try_join!(self.get_drinks(), self.get_drinks_metainfo())?;

        drinks_metainfo
            .alcohols
            .retain(|alcohol| drinks.iter().any(|drink| drink.alcohol.title == alcohol.title));

        Ok(DrinksAndMetainfo { drinks, drinks_metainfo })
    }

    pub async fn get_drink(&self, page_id: &str) -> Result<Drink, Error> {
        let page = self.api.get_page(page_id).await?;
        Ok(parse_drink(&page)?)
    }

    pub async fn get_drink_body(&self, page_id: &str) -> Result<DrinkBody, Error> {
        let blocks = self.api.get_blocks_with_children(page_id).await?;
        Ok(parse_drink_body(&blocks)?)
    }

    pub async fn get_drink_with_body(&self, page_id: &str) -> Result<DrinkWithBody, Error> {
        let (drink, body) = futures::try_join!(self.get_drink(page_id), self.get_drink_body(page_id))?;
        Ok(DrinkWithBody { drink, body })
    }

    /// Every drink with its body. Drinks whose body does not parse are
    /// logged and skipped; upstream failures fail the whole call.
    pub async fn get_drinks_with_bodies(&self) -> Result<Vec<DrinkWithBody>, Error> {
        let drinks = self.get_drinks().await?;

        let bodies = futures::future::try_join_all(drinks.iter().map(|drink| async move {
            let blocks = self.api.get_blocks_with_children(&drink.id).await?;
            Ok::<_, Error>(parse_drink_body(&blocks))
        }))
        .await?;

        let mut result = Vec::with_capacity(drinks.len());
        for (drink, body) in drinks.into_iter().zip(bodies) {
            match body {
                Ok(body) => result.push(DrinkWithBody { drink, body }),
                Err(e) => tracing::warn!(drink_id = %drink.id, error = %e, "skipping drink body that failed to parse"),
            }
        }
        Ok(result)
    }
}
