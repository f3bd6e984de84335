use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use redis::AsyncCommands;
use redis::Client;

use crate::error::AppResult;
use crate::models::SessionPointers;

const KEY_FOLDER_ID: &str = "roleta:folder_id";
const KEY_FILE_ID: &str = "roleta:file_id";
const KEY_FILE_NAME: &str = "roleta:file_name";
const KEY_FILE_MIME: &str = "roleta:file_mime";

/// Persistence for the four session pointers. The parsed list and the
/// selection are never persisted; only these pointers survive a restart.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PointerStore: Send + Sync {
    async fn load(&self) -> AppResult<SessionPointers>;
    async fn save(&self, pointers: &SessionPointers) -> AppResult<()>;
    async fn clear(&self) -> AppResult<()>;
}

/// Pointer storage on Redis string keys
pub struct RedisPointerStore {
    redis_client: Client,
}

impl RedisPointerStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }
}

#[async_trait]
impl PointerStore for RedisPointerStore {
    async fn load(&self) -> AppResult<SessionPointers> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let (folder_id, file_id, file_name, file_mime): (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        ) = conn
            .mget((KEY_FOLDER_ID, KEY_FILE_ID, KEY_FILE_NAME, KEY_FILE_MIME))
            .await?;

        Ok(SessionPointers {
            folder_id,
            file_id,
            file_name,
            file_mime,
        })
    }

    async fn save(&self, pointers: &SessionPointers) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let fields = [
            (KEY_FOLDER_ID, &pointers.folder_id),
            (KEY_FILE_ID, &pointers.file_id),
            (KEY_FILE_NAME, &pointers.file_name),
            (KEY_FILE_MIME, &pointers.file_mime),
        ];

        let mut pipe = redis::pipe();
        for (key, value) in fields {
            match value {
                Some(value) => {
                    pipe.set(key, value).ignore();
                }
                None => {
                    pipe.del(key).ignore();
                }
            }
        }
        let _: () = pipe.query_async(&mut conn).await?;

        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .del((KEY_FOLDER_ID, KEY_FILE_ID, KEY_FILE_NAME, KEY_FILE_MIME))
            .await?;
        Ok(())
    }
}
