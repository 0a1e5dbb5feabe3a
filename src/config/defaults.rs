use serde_json::{json, Value};

/// Built-in settings every configuration is merged over.
pub(crate) fn defaults() -> Value {
    json!({
        "logger": {
            "file": null,
            "stdout_json": false,
            "level": "info"
        },
        "kafka": {
            "client_id": "flyq",
            "connect_timeout": null,
            "socket_timeout": null,
            "ssl_ca_cert": null,
            "ssl_client_cert": null,
            "ssl_client_cert_key": null,
            "ssl_ca_certs_from_system": false,
            "seed_brokers": ["localhost:9092"]
        },
        "producer": {
            "ack_timeout": 5,
            "required_acks": "all",
            "max_retries": 2,
            "retry_backoff": 1,
            "max_buffer_size": 1000,
            "max_buffer_bytesize": 10_000_000,
            "compression_codec": null,
            "compression_threshold": 1,
            "max_queue_size": 10_000,
            "delivery_threshold": 0,
            "delivery_interval": 0
        },
        "consumer": {
            "session_timeout": 30,
            "offset_commit_interval": 10,
            "offset_commit_threshold": 0,
            "heartbeat_interval": 10
        },
        "backoff": {
            "min_ms": 1000,
            "max_ms": 60000
        },
        "listeners": []
    })
}
