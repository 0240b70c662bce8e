// Streaming dashboard service - Progressive loading with chunked JSON
use crate::application::dashboard_service::{build_dashboard, DashboardOptions};
use crate::application::imbalance_repository::{ImbalanceRepository, RepositoryError, TableQuery};
use crate::domain::stream::{DashboardSkeleton, StreamMessage};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Clone)]
pub struct StreamingDashboardService {
    repository: Arc<dyn ImbalanceRepository>,
}

impl StreamingDashboardService {
    pub fn new(repository: Arc<dyn ImbalanceRepository>) -> Self {
        Self { repository }
    }

    /// Skeleton first, then one message per tile and chart, then completion.
    /// Invalid queries fail before the channel opens.
    pub async fn stream_dashboard(
        &self,
        query: &TableQuery,
        options: DashboardOptions,
    ) -> Result<mpsc::Receiver<StreamMessage>, RepositoryError> {
        let start_time = Instant::now();
        let preset = self.repository.preset(&query.preset)?;
        let table = self.repository.load_table(query).await?;
        let dashboard = build_dashboard(&preset, &table, options);

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let skeleton = DashboardSkeleton::from(&dashboard);
            let total_widgets = skeleton.widget_count();
            if tx.send(StreamMessage::Skeleton(skeleton)).await.is_err() {
                tracing::debug!("Client went away before skeleton was sent");
                return;
            }

            for tab in dashboard.tabs {
                for tile in tab.tiles {
                    let msg = StreamMessage::TileUpdate {
                        tab_id: tab.id.clone(),
                        tile_id: tile.id,
                        value: tile.value,
                    };
                    if tx.send(msg).await.is_err() {
                        return;
                    }
                }
                for chart in tab.charts {
                    let msg = StreamMessage::ChartUpdate {
                        tab_id: tab.id.clone(),
                        chart,
                    };
                    if tx.send(msg).await.is_err() {
                        return;
                    }
                }
            }

            let duration_ms = start_time.elapsed().as_millis() as u64;
            let _ = tx
                .send(StreamMessage::Complete {
                    widget_count: total_widgets,
                    duration_ms,
                })
                .await;
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::preset::PresetCatalog;
    use crate::domain::site::SiteSelection;
    use crate::infrastructure::mock_repository::MockImbalanceRepository;
    use chrono::{TimeZone, Utc};
    use futures::StreamExt;
    use tokio_stream::wrappers::ReceiverStream;

    fn service() -> StreamingDashboardService {
        let repository = Arc::new(MockImbalanceRepository::new(PresetCatalog::builtin().unwrap(), Some(3)));
        StreamingDashboardService::new(repository)
    }

    fn query(preset: &str) -> TableQuery {
        TableQuery {
            preset: preset.to_string(),
            reference_time: Utc.with_ymd_and_hms(2024, 2, 2, 14, 0, 0).unwrap(),
            selection: SiteSelection::All,
            thresholds: None,
            seed: None,
        }
    }

    #[tokio::test]
    async fn stream_starts_with_skeleton_and_ends_with_completion() {
        let rx = service()
            .stream_dashboard(&query("portfolio-flex"), DashboardOptions::default())
            .await
            .unwrap();
        let messages: Vec<StreamMessage> = ReceiverStream::new(rx).collect().await;

        let StreamMessage::Skeleton(skeleton) = &messages[0] else {
            panic!("first message was not a skeleton: {:?}", messages[0]);
        };
        let widgets = skeleton.widget_count();

        let updates = messages
            .iter()
            .filter(|m| matches!(m, StreamMessage::TileUpdate { .. } | StreamMessage::ChartUpdate { .. }))
            .count();
        assert_eq!(updates, widgets);

        let completions: Vec<&StreamMessage> = messages
            .iter()
            .filter(|m| matches!(m, StreamMessage::Complete { .. }))
            .collect();
        assert_eq!(completions.len(), 1);
        match messages.last() {
            Some(StreamMessage::Complete { widget_count, .. }) => assert_eq!(*widget_count, widgets),
            other => panic!("stream did not end with completion: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_queries_fail_before_streaming() {
        let result = service()
            .stream_dashboard(&query("nope"), DashboardOptions::default())
            .await;
        assert!(matches!(result, Err(RepositoryError::Preset(_))));

        let mut q = query("intraday");
        q.selection = SiteSelection::parse("Site X");
        let result = service().stream_dashboard(&q, DashboardOptions::default()).await;
        assert!(matches!(result, Err(RepositoryError::Selection(_))));
    }

    #[tokio::test]
    async fn updates_use_short_tags() {
        let rx = service()
            .stream_dashboard(&query("intraday"), DashboardOptions::default())
            .await
            .unwrap();
        let messages: Vec<StreamMessage> = ReceiverStream::new(rx).collect().await;
        let tags: Vec<String> = messages
            .iter()
            .map(|m| serde_json::to_value(m).unwrap()["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(tags.first().map(String::as_str), Some("skeleton"));
        assert!(tags.iter().any(|t| t == "tile"));
        assert!(tags.iter().any(|t| t == "chart"));
        assert_eq!(tags.last().map(String::as_str), Some("complete"));
    }

    #[test]
    fn messages_are_tagged() {
        let json = serde_json::to_value(StreamMessage::Complete {
            widget_count: 4,
            duration_ms: 12,
        })
        .unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["widget_count"], 4);
    }
}
