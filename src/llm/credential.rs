//! API Key 存储：进程内共享的可变凭据
//!
//! 启动时创建一次，经构造函数传给模型适配器；适配器在每次调用前读取，
//! Web 端 `/set-api-key` 在运行时替换。

use std::sync::Arc;

use tokio::sync::RwLock;

/// 可克隆的凭据句柄，所有克隆共享同一个值
#[derive(Clone, Debug, Default)]
pub struct ApiKeyStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl ApiKeyStore {
    pub fn new(initial: Option<String>) -> Self {
        let initial = initial.filter(|k| !k.trim().is_empty());
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    /// 设置新 Key；空白字符串视为清除
    pub async fn set(&self, key: impl Into<String>) {
        let key = key.into();
        let value = if key.trim().is_empty() {
            None
        } else {
            Some(key.trim().to_string())
        };
        *self.inner.write().await = value;
    }

    pub async fn is_configured(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
