//! Cached raw Notion operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use dranks_core::cache::{CacheKey, CacheObserver, CacheOptions, StaleCache, TracingObserver};
use dranks_core::Error;

use crate::notion::{ImageAsset, ImageAssetOptions, NotionApi, Page, get_image_assets};

const GET_DATABASE_PAGES: &str = "getDatabasePages";
const GET_IMAGE_ASSETS: &str = "getImageAssets";

/// Notion reads behind one stale-tolerant cache per operation.
#[derive(Debug, Clone)]
pub struct NotionClientCached {
    database_pages: StaleCache<Vec<Page>>,
    image_assets: StaleCache<BTreeMap<String, ImageAsset>>,
}

impl NotionClientCached {
    pub fn new(api: Arc<dyn NotionApi>, options: CacheOptions) -> Self {
        Self::with_observer(api, options, Arc::new(TracingObserver))
    }

    pub fn with_observer(api: Arc<dyn NotionApi>, options: CacheOptions, observer: Arc<dyn CacheObserver>) -> Self {
        let pages_api = Arc::clone(&api);
        let database_pages = StaleCache::builder("notion.database_pages", move |key: String| {
            let api = Arc::clone(&pages_api);
            async move {
                let (database_id,): (String,) = CacheKey::decode_for(&key, GET_DATABASE_PAGES)?.args_as()?;
                Ok::<_, Error>(api.get_database_pages(&database_id).await?)
            }
        })
        .options(options.clone())
        .observer(Arc::clone(&observer))
        .build();

        let image_assets = StaleCache::builder("notion.image_assets", move |key: String| {
            let api = Arc::clone(&api);
            async move {
                let (titles, asset_options): (Vec<String>, ImageAssetOptions) =
                    CacheKey::decode_for(&key, GET_IMAGE_ASSETS)?.args_as()?;
                Ok::<_, Error>(get_image_assets(api.as_ref(), &titles, &asset_options).await?)
            }
        })
        .options(options)
        .observer(observer)
        .build();

        Self { database_pages, image_assets }
    }

    /// Every page of a database.
    pub async fn get_database_pages(&self, database_id: &str) -> Result<Arc<Vec<Page>>, Error> {
        let key = CacheKey::new(GET_DATABASE_PAGES).arg(database_id)?;
        self.database_pages.get(&key.encode()).await
    }

    /// Image assets by title. The order of `titles` does not matter.
    pub async fn get_image_assets(
        &self, titles: &[String], options: &ImageAssetOptions,
    ) -> Result<Arc<BTreeMap<String, ImageAsset>>, Error> {
        let key = CacheKey::new(GET_IMAGE_ASSETS).set_arg(titles).arg(options)?;
        self.image_assets.get(&key.encode()).await
    }

    pub fn database_pages_cache(&self) -> &StaleCache<Vec<Page>> {
        &self.database_pages
    }

    pub fn image_assets_cache(&self) -> &StaleCache<BTreeMap<String, ImageAsset>> {
        &self.image_assets
    }
}
