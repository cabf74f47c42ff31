use std::sync::Arc;

use tracing::{debug, info, warn};

use flowdeck_core::event::EventBus;
use flowdeck_core::traits::RunBackend;
use flowdeck_core::types::{NodeId, RunEvent, RunRequest};
use flowdeck_graph::canvas::Canvas;
use flowdeck_graph::registry::NodeKind;

/// One step of a precomputed run plan.
#[derive(Debug, Clone)]
pub struct RunStep {
    pub node_id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub produces_series: bool,
}

/// Snapshot the canvas into an ordered run plan.
///
/// Taken synchronously before the run is spawned, so the scheduler never
/// borrows the canvas across an await point; later edits affect the next run,
/// not the one in flight.
pub fn plan(canvas: &Canvas) -> Vec<RunStep> {
    canvas
        .run_order()
        .into_iter()
        .filter_map(|id| canvas.node(id))
        .map(|node| RunStep {
            node_id: node.id,
            kind: node.kind,
            label: node.label.clone(),
            produces_series: canvas
                .registry()
                .lookup(node.kind)
                .map(|spec| spec.produces_series)
                .unwrap_or(false),
        })
        .collect()
}

/// Sequential execution scheduler.
///
/// Walks a plan one node at a time: each backend call is awaited before the
/// next starts, so execution is cooperative and never parallel. A failing node
/// is marked `error` and the pass continues, with no retry and no abort. At most one
/// run per canvas is active; the frontend's running flag makes re-invocation a
/// no-op.
pub struct Runner {
    backend: Arc<dyn RunBackend>,
    bus: Arc<EventBus>,
}

impl Runner {
    pub fn new(backend: Arc<dyn RunBackend>, bus: Arc<EventBus>) -> Self {
        Self { backend, bus }
    }

    /// Execute a full pass over the plan, publishing progress events.
    pub async fn run(&self, steps: Vec<RunStep>) {
        let total = steps.len();
        info!(total, "Run pass starting");
        self.bus.publish(RunEvent::RunStarted { total });

        for step in &steps {
            self.bus.publish(RunEvent::NodeQueued { id: step.node_id });
        }

        for (i, step) in steps.iter().enumerate() {
            let step_no = i + 1;
            self.bus.publish(RunEvent::NodeStarted {
                id: step.node_id,
                step: step_no,
                total,
            });

            let request = RunRequest {
                node_id: step.node_id.to_string(),
                node_type: step.kind.wire_name().to_string(),
                node_label: step.label.clone(),
                step: step_no,
                total_steps: total,
            };

            match self.backend.run_node(&request).await {
                Ok(reply) => {
                    debug!(node = %step.node_id, step = step_no, %reply, "Node run succeeded");
                    self.bus.publish(RunEvent::NodeFinished {
                        id: step.node_id,
                        ok: true,
                    });

                    if step.produces_series {
                        if let Some(series) = self.backend.fetch_series(step.node_id).await {
                            self.bus.publish(RunEvent::SeriesReady {
                                id: step.node_id,
                                series,
                            });
                        }
                    }
                }
                Err(e) => {
                    warn!(node = %step.node_id, step = step_no, error = %e, "Node run failed, continuing");
                    self.bus.publish(RunEvent::NodeFinished {
                        id: step.node_id,
                        ok: false,
                    });
                }
            }
        }

        info!(total, "Run pass finished");
        self.bus.publish(RunEvent::RunFinished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use flowdeck_core::error::{FlowdeckError, Result};
    use flowdeck_core::types::{SeriesData, VisualState, WorldPoint};
    use flowdeck_graph::registry::{NodeRegistry, NodeSpec};
    use flowdeck_graph::view::ViewTransform;

    /// Backend stub: fails configured node ids, records request order.
    struct StubBackend {
        fail_ids: Vec<String>,
        calls: Mutex<Vec<RunRequest>>,
        series_fetches: Mutex<Vec<NodeId>>,
        series: Option<SeriesData>,
    }

    impl StubBackend {
        fn new(fail_ids: Vec<&str>) -> Self {
            Self {
                fail_ids: fail_ids.into_iter().map(String::from).collect(),
                calls: Mutex::new(vec![]),
                series_fetches: Mutex::new(vec![]),
                series: Some(SeriesData {
                    x: vec![0.0, 1.0],
                    y: vec![2.0, 3.0],
                }),
            }
        }
    }

    impl RunBackend for StubBackend {
        fn run_node(&self, request: &RunRequest) -> BoxFuture<'_, Result<String>> {
            let request = request.clone();
            Box::pin(async move {
                self.calls.lock().unwrap().push(request.clone());
                if self.fail_ids.contains(&request.node_id) {
                    Err(FlowdeckError::BackendStatus {
                        status: 500,
                        body: "boom".into(),
                    })
                } else {
                    Ok("ok".into())
                }
            })
        }

        fn fetch_series(&self, node_id: NodeId) -> BoxFuture<'_, Option<SeriesData>> {
            Box::pin(async move {
                self.series_fetches.lock().unwrap().push(node_id);
                self.series.clone()
            })
        }
    }

    fn pipeline_canvas() -> Canvas {
        let mut specs = HashMap::new();
        specs.insert(
            NodeKind::Build,
            NodeSpec::new("build").outgoing(1, vec![NodeKind::Compute]),
        );
        specs.insert(
            NodeKind::Compute,
            NodeSpec::new("compute")
                .incoming(1, vec![NodeKind::Build])
                .outgoing(1, vec![NodeKind::Validate])
                .produces_series(),
        );
        specs.insert(
            NodeKind::Validate,
            NodeSpec::new("validate").incoming(1, vec![NodeKind::Compute]),
        );
        let mut canvas = Canvas::new(NodeRegistry::new(specs).unwrap(), ViewTransform::default());
        let b1 = canvas
            .add_node(NodeKind::Build, WorldPoint::new(0.0, 0.0))
            .unwrap();
        let c1 = canvas
            .add_node(NodeKind::Compute, WorldPoint::new(10.0, 0.0))
            .unwrap();
        let v1 = canvas
            .add_node(NodeKind::Validate, WorldPoint::new(20.0, 0.0))
            .unwrap();
        canvas.try_connect(b1, c1).unwrap();
        canvas.try_connect(c1, v1).unwrap();
        canvas
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<RunEvent>) -> Vec<RunEvent> {
        let mut events = vec![];
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_full_pass_in_topological_order() {
        let canvas = pipeline_canvas();
        let backend = Arc::new(StubBackend::new(vec![]));
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();

        let steps = plan(&canvas);
        assert_eq!(steps.len(), 3);
        Runner::new(backend.clone(), bus).run(steps).await;

        let calls = backend.calls.lock().unwrap();
        let order: Vec<&str> = calls.iter().map(|r| r.node_id.as_str()).collect();
        assert_eq!(order, vec!["n0", "n1", "n2"]);
        assert_eq!(calls[0].step, 1);
        assert_eq!(calls[2].step, 3);
        assert!(calls.iter().all(|r| r.total_steps == 3));

        let events = drain(&mut rx);
        assert!(matches!(events.first(), Some(RunEvent::RunStarted { total: 3 })));
        assert!(matches!(events.last(), Some(RunEvent::RunFinished)));
        let queued = events
            .iter()
            .filter(|e| matches!(e, RunEvent::NodeQueued { .. }))
            .count();
        assert_eq!(queued, 3);
    }

    #[tokio::test]
    async fn test_failed_node_marked_and_pass_continues() {
        let canvas = pipeline_canvas();
        // c1 is n1; its backend call returns a 500
        let backend = Arc::new(StubBackend::new(vec!["n1"]));
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();

        Runner::new(backend.clone(), bus).run(plan(&canvas)).await;

        // v1 (n2) was still attempted after the failure
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);

        let events = drain(&mut rx);
        let finished: Vec<(String, bool)> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::NodeFinished { id, ok } => Some((id.to_string(), *ok)),
                _ => None,
            })
            .collect();
        assert_eq!(
            finished,
            vec![
                ("n0".to_string(), true),
                ("n1".to_string(), false),
                ("n2".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn test_series_fetched_only_for_producing_kinds() {
        let canvas = pipeline_canvas();
        let backend = Arc::new(StubBackend::new(vec![]));
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();

        Runner::new(backend.clone(), bus).run(plan(&canvas)).await;

        // Only the Compute node is data-producing
        let fetches = backend.series_fetches.lock().unwrap();
        assert_eq!(*fetches, vec![NodeId(1)]);

        let events = drain(&mut rx);
        let series: Vec<NodeId> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::SeriesReady { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(series, vec![NodeId(1)]);
    }

    #[tokio::test]
    async fn test_no_series_fetch_after_failure() {
        let canvas = pipeline_canvas();
        let backend = Arc::new(StubBackend::new(vec!["n1"]));
        let bus = Arc::new(EventBus::default());

        Runner::new(backend.clone(), bus).run(plan(&canvas)).await;

        assert!(backend.series_fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_plan_still_brackets_events() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let backend = Arc::new(StubBackend::new(vec![]));

        Runner::new(backend, bus).run(vec![]).await;

        let events = drain(&mut rx);
        assert!(matches!(events[0], RunEvent::RunStarted { total: 0 }));
        assert!(matches!(events[1], RunEvent::RunFinished));
    }

    #[test]
    fn test_plan_resolves_series_flag_and_labels() {
        let canvas = pipeline_canvas();
        let steps = plan(&canvas);
        assert_eq!(steps[1].label, "Compute 1");
        assert!(steps[1].produces_series);
        assert!(!steps[0].produces_series);
        assert!(!steps[2].produces_series);
    }

    // Visual-state bookkeeping lives in the frontend, but the mapping from
    // events to states is part of the contract; sanity-check it here.
    #[test]
    fn test_event_to_state_mapping() {
        let mut canvas = pipeline_canvas();
        let id = canvas.nodes()[0].id;
        canvas.set_visual(id, VisualState::Running);
        assert_eq!(canvas.node(id).unwrap().visual_state(), VisualState::Running);
        canvas.reset_visuals();
        assert_eq!(canvas.node(id).unwrap().visual_state(), VisualState::Idle);
    }
}
