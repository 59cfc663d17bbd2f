use super::{block_on, Context};
use anyhow::Result;
use partsdb_core::seed;
use partsdb_core::store::{MemoryStore, PartStore, PgStore};
use partsdb_server::TokenAuth;
use std::sync::Arc;

pub fn run(ctx: &Context, host: Option<String>, port: Option<u16>, memory: bool) -> Result<()> {
    let mut server = ctx.config.server.clone();
    if let Some(h) = host {
        server.host = h;
    }
    if let Some(p) = port {
        server.port = p;
    }
    for w in ctx.config.validate() {
        tracing::warn!("config: {}", w.message);
    }

    block_on(async move {
        let store: Arc<dyn PartStore> = if memory {
            let store = MemoryStore::new();
            seed::seed(&store).await?;
            tracing::info!("serving seeded in-memory store");
            Arc::new(store)
        } else {
            ctx.config.ensure_valid()?;
            // Lazy pool: the API comes up before the database and /health reports 503.
            let db = &ctx.config.database;
            Arc::new(PgStore::connect_lazy(&db.dsn, db.max_connections)?)
        };

        let auth = TokenAuth::with_token(server.token.clone());
        partsdb_server::serve(&server.bind_addr(), store, auth).await
    })
}
