//! Cached drink catalog.

use std::sync::Arc;

use dranks_core::cache::{CacheKey, CacheObserver, CacheOptions, StaleCache, TracingObserver};
use dranks_core::Error;

use crate::drinks::{DrinkWithBody, DrinksAndMetainfo, DrinksClient};

const GET_DRINKS_AND_METAINFO: &str = "getDrinksAndMetaInfo";
const GET_DRINK_WITH_BODY: &str = "getDrinkWithBody";

/// The drink catalog behind stale-tolerant caches.
///
/// The full list is one fixed-key entry; each drink with its body is keyed
/// by page id.
#[derive(Debug, Clone)]
pub struct DrinksClientCached {
    client: DrinksClient,
    drinks_and_metainfo: StaleCache<DrinksAndMetainfo>,
    drink_with_body: StaleCache<DrinkWithBody>,
}

impl DrinksClientCached {
    pub fn new(client: DrinksClient, options: CacheOptions) -> Self {
        Self::with_observer(client, options, Arc::new(TracingObserver))
    }

    pub fn with_observer(client: DrinksClient, options: CacheOptions, observer: Arc<dyn CacheObserver>) -> Self {
        let list_client = client.clone();
        let drinks_and_metainfo = StaleCache::builder("drinks.list", move |_key: String| {
            let client = list_client.clone();
            async move { client.get_drinks_and_metainfo().await }
        })
        .options(options.clone())
        .observer(Arc::clone(&observer))
        .build();

        let body_client = client.clone();
        let drink_with_body = StaleCache::builder("drinks.detail", move |key: String| {
            let client = body_client.clone();
            async move {
                let (page_id,): (String,) = CacheKey::decode_for(&key, GET_DRINK_WITH_BODY)?.args_as()?;
                client.get_drink_with_body(&page_id).await
            }
        })
        .options(options)
        .observer(observer)
        .build();

        Self { client, drinks_and_metainfo, drink_with_body }
    }

    /// Every drink plus catalog metainfo.
    pub async fn get_drinks_and_metainfo(&self) -> Result<Arc<DrinksAndMetainfo>, Error> {
        self.drinks_and_metainfo.get(&list_key()).await
    }

    /// One drink with its recipe body.
    pub async fn get_drink_with_body(&self, page_id: &str) -> Result<Arc<DrinkWithBody>, Error> {
        let key = CacheKey::new(GET_DRINK_WITH_BODY).arg(page_id)?;
        self.drink_with_body.get(&key.encode()).await
    }

    /// Look a drink up by slug in the cached list, then load its body.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no drink has this slug.
    pub async fn find_drink_by_slug(&self, slug: &str) -> Result<Arc<DrinkWithBody>, Error> {
        let catalog = self.get_drinks_and_metainfo().await?;
        let Some(drink) = catalog.drinks.iter().find(|d| d.slug == slug) else {
            return Err(Error::NotFound(format!("no drink with slug {slug}")));
        };
        self.get_drink_with_body(&drink.id).await
    }

    pub fn client(&self) -> &DrinksClient {
        &self.client
    }

    pub fn list_cache(&self) -> &StaleCache<DrinksAndMetainfo> {
        &self.drinks_and_metainfo
    }

    pub fn detail_cache(&self) -> &StaleCache<DrinkWithBody> {
        &self.drink_with_body
    }
}

fn list_key() -> String {
    CacheKey::new(GET_DRINKS_AND_METAINFO).encode()
}
