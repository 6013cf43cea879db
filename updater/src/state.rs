//! 업데이트 결과 공유 상태
//!
//! 결과 목록과 준비 플래그는 항상 한 쌍으로 교체됩니다.
//! UI는 `snapshot()`으로 받은 `Arc`만 읽으므로 두 세대가 섞인 값을 볼 수 없습니다.

use std::sync::{Arc, PoisonError, RwLock};

use crate::compare::UpdateEntry;

/// 한 시점의 결과 스냅샷
#[derive(Debug, Clone)]
pub struct UpdateSnapshot {
    /// 첫 비교가 끝났는지 (실패/중단 포함)
    pub ready: bool,
    pub updates: Arc<[UpdateEntry]>,
    /// 게시 횟수 (0 = 아직 없음)
    pub generation: u64,
}

impl UpdateSnapshot {
    fn pending() -> Self {
        Self {
            ready: false,
            updates: Arc::from(Vec::new()),
            generation: 0,
        }
    }

    /// 준비되었고 업데이트가 하나 이상 있는지
    pub fn has_updates(&self) -> bool {
        self.ready && !self.updates.is_empty()
    }
}

/// 계산 작업만 쓰고, UI는 읽기만 하는 게시판
#[derive(Debug)]
pub struct UpdateBoard {
    current: RwLock<Arc<UpdateSnapshot>>,
}

impl Default for UpdateBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateBoard {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(UpdateSnapshot::pending())),
        }
    }

    /// 현재 스냅샷
    pub fn snapshot(&self) -> Arc<UpdateSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().ready
    }

    /// 새 결과를 게시하고 준비 상태로 바꿉니다.
    ///
    /// 이번 호출로 준비 플래그가 처음 켜졌으면 `true`를 반환합니다.
    pub fn publish(&self, updates: Vec<UpdateEntry>) -> bool {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let first = !slot.ready;
        *slot = Arc::new(UpdateSnapshot {
            ready: true,
            updates: Arc::from(updates),
            generation: slot.generation + 1,
        });
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> UpdateEntry {
        UpdateEntry {
            id: id.into(),
            installed_version: "1".into(),
            latest_version: "2".into(),
        }
    }

    #[test]
    fn starts_pending_and_empty() {
        let board = UpdateBoard::new();
        let snap = board.snapshot();
        assert!(!snap.ready);
        assert!(snap.updates.is_empty());
        assert_eq!(snap.generation, 0);
        assert!(!snap.has_updates());
    }

    #[test]
    fn readiness_flips_exactly_once() {
        let board = UpdateBoard::new();
        assert!(board.publish(vec![]));
        assert!(board.is_ready());
        assert!(!board.publish(vec![entry("a")]));
        assert!(board.is_ready());
        assert_eq!(board.snapshot().generation, 2);
    }

    #[test]
    fn held_snapshot_is_not_mutated_by_later_publish() {
        let board = UpdateBoard::new();
        board.publish(vec![entry("a")]);
        let held = board.snapshot();

        board.publish(vec![entry("b"), entry("c")]);

        assert_eq!(held.updates.len(), 1);
        assert_eq!(held.updates[0].id, "a");
        assert_eq!(board.snapshot().updates.len(), 2);
    }
}
