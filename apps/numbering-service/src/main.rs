//! # Numbering Service サーバー
//!
//! 文書番号の採番を担当する API サーバー。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NUMBERING_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `NUMBERING_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `AGGREGATE_DEPARTMENT_CODE` | No | 部署単位で連番を共有する部署の短縮コード（デフォルト: `BDS`） |
//! | `NUMBERING_UTC_OFFSET` | No | 月の区切りに使う UTC オフセット（デフォルト: `+00:00`） |
//! | `ALLOCATION_MAX_ATTEMPTS` | No | 競合時の最大試行回数（デフォルト: 5） |
//! | `ALLOCATION_BACKOFF_BASE_MS` | No | 再試行の待機時間の基準（デフォルト: 20） |
//! | `ALLOCATION_BACKOFF_MAX_MS` | No | 再試行の待機時間の上限（デフォルト: 500） |
//! | `ALLOCATION_TIMEOUT_MS` | No | 採番処理のタイムアウト（デフォルト: 10000） |
//! | `RUN_MIGRATIONS` | No | 起動時にマイグレーションを適用するか（デフォルト: `true`） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! NUMBERING_PORT=14000 DATABASE_URL=postgres://... cargo run -p penomoran-numbering-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use penomoran_domain::clock::{Clock, SystemClock};
use penomoran_infra::{
    db::{self, PgTransactionManager, TransactionManager},
    repository::{
        IssuedDocumentRepository,
        MasterDataRepository,
        PostgresIssuedDocumentRepository,
        PostgresMasterDataRepository,
        PostgresScopeCounterRepository,
        ScopeCounterRepository,
    },
};
use penomoran_numbering_service::{
    ApiStates,
    api_router,
    config::NumberingConfig,
    handler::{
        DocumentState,
        MasterDataState,
        NumberState,
        ReadinessState,
        ScopeState,
        health_check,
        readiness_check,
    },
    usecase::{
        AllocationSettings,
        DocumentUseCase,
        MasterDataResolver,
        NumberAllocator,
        ScopeUsageUseCase,
    },
};
use penomoran_shared::observability::{MakeRequestUuidV7, TracingConfig, make_request_span};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Numbering Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("numbering-service");
    penomoran_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "numbering-service").entered();

    // 設定読み込み
    let config = NumberingConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        aggregate_department_code = %config.allocation.aggregate_department_code,
        utc_offset = %config.allocation.utc_offset,
        max_attempts = config.allocation.max_attempts,
        "Numbering Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    if config.run_migrations {
        db::run_migrations(&pool)
            .await
            .context("マイグレーションの実行に失敗しました")?;
        tracing::info!("マイグレーションを適用しました");
    }

    // Readiness Check 用 State（pool が move される前に clone）
    let readiness_state = Arc::new(ReadinessState { pool: pool.clone() });

    // 依存コンポーネントを初期化
    let master_data_repo: Arc<dyn MasterDataRepository> =
        Arc::new(PostgresMasterDataRepository::new(pool.clone()));
    let counter_repo: Arc<dyn ScopeCounterRepository> =
        Arc::new(PostgresScopeCounterRepository::new(pool.clone()));
    let document_repo: Arc<dyn IssuedDocumentRepository> =
        Arc::new(PostgresIssuedDocumentRepository::new(pool.clone()));
    let tx_manager: Arc<dyn TransactionManager> = Arc::new(PgTransactionManager::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let resolver = MasterDataResolver::new(master_data_repo);
    let settings = AllocationSettings::from(&config.allocation);

    let states = ApiStates {
        number:      Arc::new(NumberState {
            allocator: NumberAllocator::new(
                resolver.clone(),
                counter_repo.clone(),
                document_repo.clone(),
                tx_manager,
                clock,
                settings.clone(),
            ),
        }),
        document:    Arc::new(DocumentState {
            usecase: DocumentUseCase::new(document_repo.clone()),
        }),
        master_data: Arc::new(MasterDataState {
            resolver: resolver.clone(),
        }),
        scope:       Arc::new(ScopeState {
            usecase: ScopeUsageUseCase::new(
                resolver,
                counter_repo,
                document_repo,
                settings.scope_rule,
                settings.utc_offset,
            ),
        }),
    };

    // ルーター構築
    let app = Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(api_router(states))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Numbering Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
