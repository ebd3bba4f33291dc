//! End-to-end smoke test for miniroha-node.
//!
//! Starts a real node process against a fresh genesis, submits a
//! transaction via the HTTP surface, and asserts state changes are
//! reflected once the timer-driven producer commits it.
//!
//! Run with:
//!   cargo test -p miniroha-node --test smoke

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use miniroha_core::{
    Account, AccountId, Amount, Asset, AssetId, Balance, Domain, DomainId, Instruction, Role,
    RoleId, Signature, Transaction, TransactionBody, Validator, ValidatorId,
};

struct NodeGuard {
    child: Child,
    data_dir: PathBuf,
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

async fn wait_for_health(client: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Ok(resp) = client.get(format!("{url}/health")).send().await {
            if resp.status().is_success() {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

fn sign(kp: &miniroha_crypto::KeyPair, body: TransactionBody) -> Transaction {
    let bytes = miniroha_crypto::canonical_bytes(&body).unwrap();
    let signature = Signature {
        public_key: kp.public_key_b58(),
        signature: kp.sign(&bytes),
    };
    Transaction { body, signature }
}

#[tokio::test]
async fn smoke_submit_transfer_and_commit() {
    let data_dir = std::env::temp_dir().join(format!("miniroha_node_smoke_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&data_dir);
    std::fs::create_dir_all(&data_dir).unwrap();

    let admin_kp = miniroha_crypto::KeyPair::generate();
    let alice_kp = miniroha_crypto::KeyPair::generate();

    let genesis = miniroha_genesis::GenesisConfig {
        chain_id: "miniroha-test".into(),
        domains: vec![Domain {
            id: DomainId::new("root").unwrap(),
            created_at: 0,
        }],
        accounts: vec![
            miniroha_genesis::GenesisAccount {
                account: Account {
                    id: AccountId::new("admin@root").unwrap(),
                    public_key: admin_kp.public_key_b58(),
                    created_at: 0,
                },
                roles: vec!["admin".into()],
            },
            miniroha_genesis::GenesisAccount {
                account: Account {
                    id: AccountId::new("alice@root").unwrap(),
                    public_key: alice_kp.public_key_b58(),
                    created_at: 0,
                },
                roles: vec!["user".into()],
            },
            miniroha_genesis::GenesisAccount {
                account: Account {
                    id: AccountId::new("bob@root").unwrap(),
                    public_key: "ed25519:unused".into(),
                    created_at: 0,
                },
                roles: vec!["user".into()],
            },
        ],
        assets: vec![Asset {
            id: AssetId::new("usd#root").unwrap(),
            precision: 2,
            created_at: 0,
        }],
        balances: vec![Balance {
            asset_id: AssetId::new("usd#root").unwrap(),
            account_id: AccountId::new("alice@root").unwrap(),
            amount: Amount::from(100_000u64),
        }],
        roles: vec![
            Role {
                id: RoleId("admin".into()),
                permissions: vec!["*".into()],
            },
            Role {
                id: RoleId("user".into()),
                permissions: vec!["TransferAsset".into()],
            },
        ],
        validators: vec![Validator {
            id: ValidatorId("node1".into()),
            public_key: admin_kp.public_key_b58(),
        }],
    };
    let genesis_path = data_dir.join("genesis.json");
    std::fs::write(&genesis_path, serde_json::to_string(&genesis).unwrap()).unwrap();

    let port = free_port();
    let base_url = format!("http://127.0.0.1:{port}");
    let node_bin = env!("CARGO_BIN_EXE_miniroha-node");
    let child = Command::new(node_bin)
        .args([
            "--port",
            &port.to_string(),
            "--db-path",
            data_dir.join("state").to_str().unwrap(),
            "--genesis",
            genesis_path.to_str().unwrap(),
            "--node-id",
            "node1",
        ])
        .env("MINIROHA_BLOCK_INTERVAL_MS", "300")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn miniroha-node");
    let _guard = NodeGuard { child, data_dir };

    let http = reqwest::Client::new();
    assert!(
        wait_for_health(&http, &base_url, Duration::from_secs(10)).await,
        "miniroha-node did not become ready in time"
    );

    let info: serde_json::Value = http.get(format!("{base_url}/info")).send().await.unwrap().json().await.unwrap();
    assert_eq!(info["data"]["last_height"], 1);

    let tx = sign(
        &alice_kp,
        TransactionBody {
            chain_id: "miniroha-test".into(),
            signer_id: AccountId::new("alice@root").unwrap(),
            nonce: 1,
            created_at: 1,
            instructions: vec![Instruction::TransferAsset {
                asset_id: AssetId::new("usd#root").unwrap(),
                src: AccountId::new("alice@root").unwrap(),
                dst: AccountId::new("bob@root").unwrap(),
                amount: "100".into(),
            }],
        },
    );
    let submit_resp: serde_json::Value = http
        .post(format!("{base_url}/tx"))
        .json(&serde_json::json!({"tx": tx}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submit_resp["success"], true, "submit response: {submit_resp}");

    let mempool: serde_json::Value = http.get(format!("{base_url}/mempool")).send().await.unwrap().json().await.unwrap();
    assert_eq!(mempool["data"]["size"], 1);

    // Give the timer-driven producer a couple of ticks to commit.
    tokio::time::sleep(Duration::from_millis(900)).await;

    let alice_balance: serde_json::Value = http
        .get(format!("{base_url}/query/balance/usd%23root/alice%40root"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alice_balance["data"]["amount"], "90000");

    let bob_balance: serde_json::Value = http
        .get(format!("{base_url}/query/balance/usd%23root/bob%40root"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bob_balance["data"]["amount"], "10000");

    let mempool_after: serde_json::Value = http.get(format!("{base_url}/mempool")).send().await.unwrap().json().await.unwrap();
    assert_eq!(mempool_after["data"]["size"], 0);
}
