//! Key Lock Registry - 按缓存 key 的互斥锁表
//!
//! 同一 key 的并发合成收敛为一次外部调用；不同 key 的锁完全独立，
//! 不存在全局串行化。

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 按缓存 key 维护互斥锁
///
/// 锁槽位在首次使用时创建并复用，规模以语料条目数为上界
#[derive(Default)]
pub struct KeyLockRegistry {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyLockRegistry {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 取某个 key 的锁句柄
    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
