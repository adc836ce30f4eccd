//! MongoDB database connection and index management

use mongodb::bson::doc;
use mongodb::{options::ClientOptions, options::IndexOptions, Client, Database, IndexModel};

/// MongoDB database wrapper
#[derive(Clone)]
pub struct MongoDb {
    #[allow(dead_code)]
    client: Client,
    db: Database,
}

impl MongoDb {
    /// Connect to MongoDB
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;
        let db = client.database(db_name);

        // Test connection
        db.run_command(doc! { "ping": 1 }, None).await?;
        tracing::info!("Connected to MongoDB: {}", db_name);

        let instance = Self { client, db };

        // Ensure indexes exist
        instance.ensure_indexes().await?;

        Ok(instance)
    }

    /// Get database reference
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Get collection
    pub fn collection<T>(&self, name: &str) -> mongodb::Collection<T> {
        self.db.collection(name)
    }

    /// Ping the database to check connection
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.db
            .run_command(mongodb::bson::doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    /// Ensure all required indexes exist
    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        tracing::info!("Ensuring MongoDB indexes...");

        // Owners collection indexes
        self.create_indexes(
            collections::OWNERS,
            vec![
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .partial_filter_expression(doc! { "is_deleted": false })
                            .build(),
                    )
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "location": "2dsphere" })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "requests.status": 1 })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "requests.respondent_ids": 1 })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "requests.carer_id": 1 })
                    .build(),
                IndexModel::builder().keys(doc! { "pets.id": 1 }).build(),
                IndexModel::builder()
                    .keys(doc! { "created_at": -1 })
                    .build(),
                IndexModel::builder().keys(doc! { "is_deleted": 1 }).build(),
            ],
        )
        .await?;

        // Carers collection indexes
        self.create_indexes(
            collections::CARERS,
            vec![
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .partial_filter_expression(doc! { "is_deleted": false })
                            .build(),
                    )
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "location": "2dsphere" })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "offers.request_id": 1 })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "offers.status": 1 })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "preferred_pet_types": 1 })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "created_at": -1 })
                    .build(),
                IndexModel::builder().keys(doc! { "is_deleted": 1 }).build(),
            ],
        )
        .await?;

        // Images collection indexes
        self.create_indexes(
            collections::IMAGES,
            vec![
                IndexModel::builder()
                    .keys(doc! { "uploaded_by": 1 })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "created_at": -1 })
                    .build(),
            ],
        )
        .await?;

        tracing::info!("MongoDB indexes ensured successfully");
        Ok(())
    }

    /// Helper to create indexes for a collection
    async fn create_indexes(
        &self,
        collection: &str,
        indexes: Vec<IndexModel>,
    ) -> anyhow::Result<()> {
        let coll = self.db.collection::<mongodb::bson::Document>(collection);
        coll.create_indexes(indexes, None).await?;
        Ok(())
    }
}

/// Collection names
pub mod collections {
    pub const OWNERS: &str = "owners";
    pub const CARERS: &str = "carers";
    pub const IMAGES: &str = "images";
}
