use std::{fmt, sync::Arc};

use cinerate_config::Config;
use cinerate_core::{
    ImageUrls, ImportPipeline, ListingFormatter, MetadataProvider, MovieStore, RatingEngine,
    ReviewService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn MetadataProvider>,
    pub store: Arc<dyn MovieStore>,
    pub urls: ImageUrls,
    pub pipeline: ImportPipeline,
    pub rating: RatingEngine,
    pub reviews: ReviewService,
    pub listings: ListingFormatter,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn MetadataProvider>,
        store: Arc<dyn MovieStore>,
    ) -> Self {
        let urls = ImageUrls::new(&config.tmdb);
        let pipeline = ImportPipeline::new(provider.clone(), store.clone(), urls.clone());
        let rating = RatingEngine::new(store.clone(), provider.clone(), urls.clone());
        let reviews = ReviewService::new(store.clone(), pipeline.clone());
        let listings = ListingFormatter::new(provider.clone(), store.clone(), urls.clone());

        Self {
            config,
            provider,
            store,
            urls,
            pipeline,
            rating,
            reviews,
            listings,
        }
    }
}
