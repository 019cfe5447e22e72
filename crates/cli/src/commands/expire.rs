use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use hearth::ReportOutcome;
use tracing::{debug, info};

use crate::collaborators::{AnalyticsCollaborator, DropNotice, NotificationCollaborator, init_all};
use crate::context::CommandContext;
use crate::error::Result;
use crate::output::{CommandResult, ExpireData, print_result};

/// Races `reporters` concurrent invalid-session reports against the
/// hydrated session and reports how many drop events were delivered.
pub async fn run(ctx: &CommandContext, reporters: usize) -> Result<()> {
	let bootstrapper = ctx.bootstrapper();
	let store = bootstrapper.setup().await?;

	let notice = DropNotice::default();
	let analytics = AnalyticsCollaborator::default();
	let notifications = NotificationCollaborator::default();
	init_all(&store, &[&notice, &analytics, &notifications]).await;

	let delivered = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&delivered);
	let _counter_handle = store.register_session_drop_handler(move |_| {
		counter.fetch_add(1, Ordering::SeqCst);
		Ok(())
	});

	// Reports are synchronous and may remove the session file.
	debug!(target = "hearth.host", reporters, epoch = store.epoch(), "spawning reporters");
	let tasks = (0..reporters).map(|_| {
		let monitor = bootstrapper.monitor(&store);
		tokio::task::spawn_blocking(move || monitor.report_invalid_session())
	});

	let mut data = ExpireData {
		reporters,
		dropped: 0,
		redundant: 0,
		drop_events_delivered: 0,
		authenticated_after: false,
		notices: Vec::new(),
		analytics_events: Vec::new(),
	};
	for outcome in join_all(tasks).await {
		match outcome? {
			ReportOutcome::Dropped => data.dropped += 1,
			ReportOutcome::Redundant => data.redundant += 1,
		}
	}

	data.drop_events_delivered = delivered.load(Ordering::SeqCst);
	data.authenticated_after = store.is_authenticated();
	data.notices = notice.notices();
	data.analytics_events = analytics.events();
	info!(target = "hearth.host", dropped = data.dropped, redundant = data.redundant, "reporters finished");

	bootstrapper.teardown(store);
	print_result(ctx.format(), &CommandResult::success("expire", data, ctx.take_diagnostics()));
	Ok(())
}
