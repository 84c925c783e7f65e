//! End-to-end tests for ECDH message encryption over the gateway.

use secpgate::{encoding, Error, Gateway};

async fn keypair(gateway: &Gateway, compressed: bool) -> (String, String) {
    let seckey = gateway.generate_key().await.unwrap();
    let pubkey = gateway.compute_pubkey(&seckey, compressed).await.unwrap();
    (seckey, pubkey)
}

#[tokio::test]
async fn both_directions_decrypt() {
    let gateway = Gateway::new();
    let (seckey_a, pubkey_a) = keypair(&gateway, true).await;
    let (seckey_b, pubkey_b) = keypair(&gateway, true).await;

    let message = "meet at the usual place";
    let from_a = gateway
        .encrypt_ecdh(&seckey_a, &pubkey_b, message)
        .await
        .unwrap();
    let from_b = gateway
        .encrypt_ecdh(&seckey_b, &pubkey_a, message)
        .await
        .unwrap();

    assert_eq!(
        gateway
            .decrypt_ecdh(&seckey_b, &pubkey_a, &from_a)
            .await
            .unwrap(),
        message
    );
    assert_eq!(
        gateway
            .decrypt_ecdh(&seckey_a, &pubkey_b, &from_b)
            .await
            .unwrap(),
        message
    );
}

#[tokio::test]
async fn unicode_and_boundary_payloads_roundtrip() {
    let gateway = Gateway::new();
    let (seckey_a, pubkey_a) = keypair(&gateway, true).await;
    let (seckey_b, pubkey_b) = keypair(&gateway, true).await;

    // Single bytes, multi-byte UTF-8, and lengths straddling cipher block
    // boundaries.
    let payloads = [
        "1",
        "我",
        "*)(&Y(Y(FDS",
        "我的你的他的事把八八八八把",
        "00000000",
        "0000000011111111",
        "00000000111111112222222233333333",
        "000000001111111122222222333333334",
    ];

    for payload in payloads {
        let ciphertext = gateway
            .encrypt_ecdh(&seckey_a, &pubkey_b, payload)
            .await
            .unwrap();
        let plaintext = gateway
            .decrypt_ecdh(&seckey_b, &pubkey_a, &ciphertext)
            .await
            .unwrap();
        assert_eq!(plaintext, payload);
    }
}

#[tokio::test]
async fn public_key_form_does_not_matter() {
    let gateway = Gateway::new();
    let (seckey_a, pubkey_a) = keypair(&gateway, true).await;
    let seckey_b = gateway.generate_key().await.unwrap();
    let pubkey_b_uncompressed = gateway.compute_pubkey(&seckey_b, false).await.unwrap();

    let ciphertext = gateway
        .encrypt_ecdh(&seckey_a, &pubkey_b_uncompressed, "form-agnostic")
        .await
        .unwrap();
    let plaintext = gateway
        .decrypt_ecdh(&seckey_b, &pubkey_a, &ciphertext)
        .await
        .unwrap();
    assert_eq!(plaintext, "form-agnostic");
}

#[tokio::test]
async fn tampered_ciphertext_is_rejected() {
    let gateway = Gateway::new();
    let (seckey_a, pubkey_a) = keypair(&gateway, true).await;
    let (seckey_b, pubkey_b) = keypair(&gateway, true).await;

    let ciphertext = gateway
        .encrypt_ecdh(&seckey_a, &pubkey_b, "do not touch")
        .await
        .unwrap();
    let mut payload = encoding::decode(&ciphertext).unwrap();
    let last = payload.len() - 1;
    payload[last] ^= 0x01;

    let err = gateway
        .decrypt_ecdh(&seckey_b, &pubkey_a, &encoding::encode(&payload))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn a_third_party_cannot_decrypt() {
    let gateway = Gateway::new();
    let (seckey_a, pubkey_a) = keypair(&gateway, true).await;
    let (_, pubkey_b) = keypair(&gateway, true).await;
    let (seckey_c, _) = keypair(&gateway, true).await;

    let ciphertext = gateway
        .encrypt_ecdh(&seckey_a, &pubkey_b, "not for charlie")
        .await
        .unwrap();
    let err = gateway
        .decrypt_ecdh(&seckey_c, &pubkey_a, &ciphertext)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn encryption_is_randomized() {
    let gateway = Gateway::new();
    let (seckey_a, _) = keypair(&gateway, true).await;
    let (_, pubkey_b) = keypair(&gateway, true).await;

    let first = gateway
        .encrypt_ecdh(&seckey_a, &pubkey_b, "same message")
        .await
        .unwrap();
    let second = gateway
        .encrypt_ecdh(&seckey_a, &pubkey_b, "same message")
        .await
        .unwrap();
    assert_ne!(first, second);
}
