mod common;

use std::{net::SocketAddr, time::Duration};

use tokio::sync::oneshot;

use common::{COFFEE, SANDWICH, TEA};
use pos_register::{
    cart::CheckoutError,
    client::{ClientError, HttpPosClient, PosApi},
    config::{ClientConfig, SaleConfig},
    register::{CheckoutOutcome, Register},
    routes::create_app,
    services::sale_service::get_sale,
    state::AppState,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn serve(state: AppState) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_app(state);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {err}");
        }
    });
    Ok(addr)
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        base_url: format!("http://{addr}"),
        request_timeout: Duration::from_secs(5),
        max_attempts: 2,
        retry_backoff: Duration::from_millis(10),
        require_customer_name: false,
    }
}

#[tokio::test]
async fn cashier_completes_a_sale_end_to_end() -> anyhow::Result<()> {
    let state = common::setup_state(SaleConfig::default()).await?;
    let addr = serve(state.clone()).await?;
    let config = client_config(addr);

    let mut register = Register::from_config(HttpPosClient::new(&config)?, &config);
    register.start().await?;
    assert_eq!(register.catalog().len(), 3);
    assert_eq!(register.report().map(|r| r.total_sales), Some(0));

    register.add_product(COFFEE)?;
    register.add_product(SANDWICH)?;
    register.add_product(COFFEE)?;
    register.add_product(TEA)?;
    register.decrement_line(2)?;
    assert_eq!(register.total(), dec!(200));

    register.set_cash_input("150");
    assert!(matches!(
        register.complete_sale().await,
        CheckoutOutcome::Rejected(CheckoutError::InsufficientCash { .. })
    ));

    register.set_cash_input("500");
    let sale_id = match register.complete_sale().await {
        CheckoutOutcome::Committed { sale_id, change } => {
            assert_eq!(change, dec!(300));
            sale_id
        }
        other => panic!("expected commit, got {other:?}"),
    };

    assert!(register.cart().is_empty());
    let report = register.report().expect("report loaded");
    assert_eq!(report.total_sales, 1);
    assert_eq!(report.total_income, dec!(200));

    let stored = get_sale(&state, sale_id).await?;
    let items: Vec<(i64, i32, Decimal)> = stored
        .items
        .iter()
        .map(|item| (item.product_id, item.qty, item.price))
        .collect();
    assert_eq!(items, [(COFFEE, 2, dec!(50)), (SANDWICH, 1, dec!(100))]);
    Ok(())
}

#[tokio::test]
async fn server_rejection_surfaces_its_error_message() -> anyhow::Result<()> {
    let state = common::setup_state(SaleConfig::default()).await?;
    let addr = serve(state).await?;
    let client = HttpPosClient::new(&client_config(addr))?;

    let request = common::sale(vec![common::line(COFFEE, 1, dec!(50))], dec!(75));
    match client.record_sale(&request).await {
        Err(ClientError::Server { status, message }) => {
            assert_eq!(status.as_u16(), 400);
            assert!(message.contains("does not match"), "message: {message}");
        }
        other => panic!("expected server error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn failed_submission_keeps_the_cart_for_retry() -> anyhow::Result<()> {
    let state = common::setup_state(SaleConfig::default()).await?;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (stop, stopped) = oneshot::channel::<()>();
    let app = create_app(state.clone());
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stopped.await;
            })
            .await
    });

    let config = client_config(addr);
    let mut register = Register::from_config(HttpPosClient::new(&config)?, &config);
    register.start().await?;
    register.add_product(TEA)?;
    register.add_product(TEA)?;
    register.set_cash(dec!(100));

    let _ = stop.send(());
    server.await??;

    assert!(matches!(
        register.complete_sale().await,
        CheckoutOutcome::Failed(_)
    ));
    assert_eq!(register.lines().len(), 1);
    assert_eq!(register.total(), dec!(80));
    assert_eq!(register.cash(), dec!(100));

    let (sales,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(sales, 0);

    // Back online on the same address: the same register retries its kept cart.
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = create_app(state.clone());
    tokio::spawn(async move { axum::serve(listener, app).await });

    match register.complete_sale().await {
        CheckoutOutcome::Committed { sale_id, change } => {
            assert_eq!(change, dec!(20));
            assert_eq!(get_sale(&state, sale_id).await?.items.len(), 1);
        }
        other => panic!("expected commit on retry, got {other:?}"),
    }
    assert!(register.cart().is_empty());
    Ok(())
}
