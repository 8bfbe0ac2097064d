use mongodb::{Client, Collection, Database};
use std::error::Error;

/// Collection holding the product queries
pub const PRODUCTS_COLLECTION: &str = "products";
/// Collection holding the recommendations
pub const RECOMMEND_COLLECTION: &str = "recommand";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Fail fast on an unreachable cluster
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes backing the hot query paths. The unique index on
    /// (queryId, recommandEmail) enforces one recommendation per person per
    /// query at the store level, on top of the pre-insert check.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let products = self
            .db
            .collection::<mongodb::bson::Document>(PRODUCTS_COLLECTION);

        // products(email, date) - owner listing, newest first
        let owner_index = IndexModel::builder()
            .keys(doc! { "email": 1, "date": -1 })
            .build();
        match products.create_index(owner_index).await {
            Ok(_) => log::info!("   ✅ Index created: products(email, date)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // products(productName) - substring search scans less with a seeded index
        let name_index = IndexModel::builder()
            .keys(doc! { "productName": 1 })
            .build();
        match products.create_index(name_index).await {
            Ok(_) => log::info!("   ✅ Index created: products(productName)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let recommend = self
            .db
            .collection::<mongodb::bson::Document>(RECOMMEND_COLLECTION);

        // recommand(queryId, recommandEmail) UNIQUE - one recommendation per pair
        let pair_index = IndexModel::builder()
            .keys(doc! { "queryId": 1, "recommandEmail": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match recommend.create_index(pair_index).await {
            Ok(_) => log::info!("   ✅ Index created: recommand(queryId, recommandEmail) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // recommand(email) - recommendations received on the caller's queries
        let owner_email_index = IndexModel::builder().keys(doc! { "email": 1 }).build();
        match recommend.create_index(owner_email_index).await {
            Ok(_) => log::info!("   ✅ Index created: recommand(email)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // recommand(recommandEmail) - recommendations the caller made
        let recommender_index = IndexModel::builder()
            .keys(doc! { "recommandEmail": 1 })
            .build();
        match recommend.create_index(recommender_index).await {
            Ok(_) => log::info!("   ✅ Index created: recommand(recommandEmail)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Check if the connection is healthy
    pub async fn health_check(&self) -> mongodb::error::Result<()> {
        self.db.list_collection_names().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();

        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, "suggestify_test").await;
        assert!(db.is_ok());
        assert!(db.unwrap().health_check().await.is_ok());
    }
}
