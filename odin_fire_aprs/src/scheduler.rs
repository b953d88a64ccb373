/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{future::Future, sync::{Arc, atomic::{AtomicBool, Ordering}}, time::Duration};
use tokio::{task::JoinHandle, time::{interval, MissedTickBehavior}};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// single-flight guard. At most one [`RunPermit`] exists at any time
#[derive(Debug,Clone,Default)]
pub struct RunGuard {
    busy: Arc<AtomicBool>
}

impl RunGuard {
    pub fn new()->Self { RunGuard::default() }

    pub fn try_acquire (&self)->Option<RunPermit> {
        self.busy.compare_exchange( false, true, Ordering::AcqRel, Ordering::Acquire).ok()
            .map( |_| RunPermit { busy: self.busy.clone() })
    }

    pub fn is_busy (&self)->bool { self.busy.load( Ordering::Acquire) }
}

/// releases the guard when dropped, which includes a panicking run
#[derive(Debug)]
pub struct RunPermit {
    busy: Arc<AtomicBool>
}

impl Drop for RunPermit {
    fn drop (&mut self) {
        self.busy.store( false, Ordering::Release);
    }
}

/// runs a job immediately and then in fixed intervals until the cancellation token is triggered.
/// Ticks that occur while the previous run is still in progress are dropped, not queued
pub struct RecurrenceDriver {
    period: Duration,
    cancel: CancellationToken,
    guard: RunGuard,
}

impl RecurrenceDriver {
    pub fn new (period: Duration, cancel: CancellationToken)->Self {
        RecurrenceDriver { period, cancel, guard: RunGuard::new() }
    }

    pub fn guard (&self)->&RunGuard { &self.guard }

    /// returns after cancellation once a run that was in flight has finished
    pub async fn run<F,Fut> (&self, job: F) where F: Fn()->Fut, Fut: Future<Output=()> + Send + 'static {
        info!("scheduling runs every {:?}", self.period);
        let mut ticker = interval( self.period);
        ticker.set_missed_tick_behavior( MissedTickBehavior::Skip);
        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Some(permit) = self.guard.try_acquire() {
                        let fut = job();
                        in_flight = Some( tokio::spawn( async move {
                            let _permit = permit;
                            fut.await
                        }));
                    } else {
                        debug!("previous run still in progress, tick skipped");
                    }
                }
            }
        }

        info!("scheduler stopped");
        if let Some(jh) = in_flight {
            if !jh.is_finished() {
                info!("waiting for current run to finish");
            }
            if let Err(e) = jh.await {
                warn!("run terminated abnormally: {e}");
            }
        }
    }
}
