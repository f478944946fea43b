use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{StoreError, User, UserStore};

const USERS_COLLECTION: &str = "users";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    username: String,
    password: String,
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        Self {
            id: document.id.to_hex(),
            username: document.username,
            password_hash: document.password,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MongoUserStore {
    users: Collection<UserDocument>,
}

impl MongoUserStore {
    /// Connect, then make sure the unique `username` index exists. The index build
    /// is the first round trip, so an unreachable server fails here.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let users = client
            .database(database)
            .collection::<UserDocument>(USERS_COLLECTION);

        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(index).await?;
        info!(database, collection = USERS_COLLECTION, "user collection ready");

        Ok(Self { users })
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let found = self.users.find_one(doc! { "username": username }).await?;
        Ok(found.map(User::from))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let found = self.users.find_one(doc! { "_id": object_id }).await?;
        Ok(found.map(User::from))
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let document = UserDocument {
            id: ObjectId::new(),
            username: username.to_string(),
            password: password_hash.to_string(),
        };

        match self.users.insert_one(&document).await {
            Ok(_) => Ok(document.into()),
            Err(error) if is_duplicate_key(&error) => {
                Err(StoreError::DuplicateUsername(username.to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }
}
