//! Builds the event store and map service clients from configuration.

use chrono::Utc;
use pulse_db::{EventQuery, EventStore, PostgresConfig, PostgresPool, demo_events};
use pulse_providers::{DirectionsClient, Geocoder, GeocodingClient, GoogleConfig, RouteProvider};
use tracing::info;

use crate::config::{FixedRouteConfig, ProvidersSection, StoreBackend, StoreSection};
use crate::error::StartupError;

/// Open the configured event store and seed it if asked to.
///
/// For `PostgreSQL` this connects, runs migrations and also returns the
/// pool so the caller can close it on shutdown. Demo events are only
/// inserted into an empty store, so restarting a seeded database does not
/// duplicate them.
pub async fn build_store(
    config: &StoreSection,
) -> Result<(EventStore, Option<PostgresPool>), StartupError> {
    let (store, pool) = match config.backend {
        StoreBackend::Memory => (EventStore::memory(), None),
        StoreBackend::Postgres => {
            let pool = PostgresPool::connect(&postgres_config(config)).await?;
            pool.run_migrations().await?;
            (
                EventStore::postgres(pool.event_store(config.batch_size)),
                Some(pool),
            )
        }
    };
    let store = store.with_lookup_timeout(config.lookup_timeout());

    info!(
        backend = store.backend_name(),
        lookup_timeout_ms = config.lookup_timeout_ms,
        "Event store ready"
    );

    if config.seed_demo {
        seed_demo(&store).await?;
    }

    Ok((store, pool))
}

fn postgres_config(config: &StoreSection) -> PostgresConfig {
    PostgresConfig::new(&config.postgres_url)
        .with_max_connections(config.max_connections)
        .with_connect_timeout(config.connect_timeout())
        .with_idle_timeout(config.idle_timeout())
}

async fn seed_demo(store: &EventStore) -> Result<(), StartupError> {
    let any_event = EventQuery {
        limit: Some(1),
        ..EventQuery::default()
    };
    if !store.query(&any_event).await?.is_empty() {
        info!("Store already holds events, skipping demo seed");
        return Ok(());
    }

    let events = demo_events(Utc::now());
    store.batch_insert(&events).await?;
    info!(count = events.len(), "Demo events seeded");
    Ok(())
}

fn google_config(providers: &ProvidersSection, api_key: &str) -> GoogleConfig {
    GoogleConfig::new(api_key)
        .with_directions_url(&providers.directions_url)
        .with_geocode_url(&providers.geocode_url)
        .with_timeout(providers.timeout())
}

/// Pick the route provider: Google with a key, else the fixed routes,
/// else disabled.
pub fn build_route_provider(providers: &ProvidersSection) -> Result<RouteProvider, StartupError> {
    let provider = if let Some(key) = providers.api_key() {
        RouteProvider::Google(DirectionsClient::new(&google_config(providers, key))?)
    } else if providers.fixed_routes.is_empty() {
        RouteProvider::Disabled
    } else {
        RouteProvider::Fixed(
            providers
                .fixed_routes
                .iter()
                .map(FixedRouteConfig::to_candidate)
                .collect(),
        )
    };
    info!(provider = provider.name(), "Route provider ready");
    Ok(provider)
}

/// Pick the geocoder: Google with a key, else the configured places,
/// else disabled.
pub fn build_geocoder(providers: &ProvidersSection) -> Result<Geocoder, StartupError> {
    let geocoder = if let Some(key) = providers.api_key() {
        Geocoder::Google(GeocodingClient::new(&google_config(providers, key))?)
    } else if providers.places.is_empty() {
        Geocoder::Disabled
    } else {
        Geocoder::Fixed(
            providers
                .places
                .iter()
                .map(|place| (place.name.clone(), place.coordinate()))
                .collect(),
        )
    };
    info!(geocoder = geocoder.name(), "Geocoder ready");
    Ok(geocoder)
}
