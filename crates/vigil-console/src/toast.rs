//! Terminal rendering for transient notices.

use vigil_core::{Notice, NoticeKind};

/// Print a notice with its severity tag.
pub fn show(notice: &Notice) {
    println!("[{}] {}", tag(notice.kind), notice.message);
}

fn tag(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
        NoticeKind::Info => "info",
    }
}
