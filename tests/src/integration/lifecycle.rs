//! # End-to-End PTP Socket Lifecycle
//!
//! Drives the subsystem through its inbound port ([`AdhocPtpApi`]) the way
//! an emulated client would: passive open, active open, accept, data
//! transfer, teardown. The transport is scripted, so every scenario is
//! deterministic.

#[cfg(test)]
mod tests {
    use adhoc_ptp::{
        AdhocConfig, AdhocError, AdhocPtpApi, AdhocPtpService, FixedPortSource, MacAddr,
        NoOpAddressValidator, PtpState, ScriptedTransport,
    };

    fn local_mac() -> MacAddr {
        MacAddr::new([0x02, 0x10, 0x20, 0x30, 0x40, 0x50])
    }

    fn peer_mac() -> MacAddr {
        MacAddr::new([0x02, 0x60, 0x70, 0x80, 0x90, 0xa0])
    }

    fn build_service(transport: &ScriptedTransport) -> AdhocPtpService {
        let mut service = AdhocPtpService::new(
            Box::new(transport.clone()),
            Box::new(NoOpAddressValidator::new()),
            Box::new(FixedPortSource::new(vec![40000, 40001, 40002])),
            AdhocConfig::default(),
        );
        service.init();
        service
    }

    /// Scenario: auto-bound listen succeeds with no prior registrations.
    #[test]
    fn test_listen_auto_bind_scenario() {
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport);

        let handle = service
            .listen(&local_mac(), 0, 4096, 100_000, 5, 5, 0)
            .expect("listen with auto-bind must succeed on an empty registry");

        let record = service.registry().get(handle).unwrap();
        assert_eq!(record.state, PtpState::Listening);
        assert!(record.local_port >= 1);
    }

    /// Scenario: a second listen on the same explicit port fails with
    /// `PortInUse` while the first socket stays registered.
    #[test]
    fn test_duplicate_listen_scenario() {
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport);

        service
            .listen(&local_mac(), 30000, 4096, 100_000, 5, 5, 0)
            .unwrap();
        let err = service
            .listen(&local_mac(), 30000, 4096, 100_000, 5, 5, 0)
            .unwrap_err();

        assert_eq!(err, AdhocError::PortInUse(30000));
        assert!(err.code() < 0);
        assert_eq!(service.socket_count(), 1);
    }

    /// Scenario: zero buffer size is rejected as an invalid argument.
    #[test]
    fn test_zero_buffer_scenario() {
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport);

        let err = service
            .listen(&local_mac(), 30000, 0, 100_000, 5, 5, 0)
            .unwrap_err();
        assert_eq!(err, AdhocError::InvalidArgument("buffer_size"));
        assert_eq!(service.socket_count(), 0);
        assert_eq!(transport.opened_total(), 0);
    }

    /// Full passive-side flow: listen, accept an incoming connection,
    /// exchange data, close both records.
    #[test]
    fn test_listen_accept_transfer_close_flow() {
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport);

        let listener = service
            .listen(&local_mac(), 30000, 4096, 100_000, 5, 8, 0)
            .unwrap();

        // Nothing queued yet.
        assert_eq!(
            service.accept(listener).unwrap_err(),
            AdhocError::WouldBlock
        );

        // A peer connects.
        transport.push_accept(Ok((peer_mac(), 41000)));
        let conn = service.accept(listener).unwrap();
        let record = service.registry().get(conn).unwrap();
        assert_eq!(record.state, PtpState::Established);
        assert_eq!(record.peer_addr, peer_mac());

        // Data both ways.
        assert_eq!(service.send(conn, b"ping").unwrap(), 4);
        transport.push_recv(Ok(b"pong".to_vec()));
        let mut buf = [0u8; 8];
        let n = service.recv(conn, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"pong");

        // Teardown releases everything.
        service.close(conn).unwrap();
        service.close(listener).unwrap();
        assert_eq!(service.socket_count(), 0);
        assert_eq!(transport.open_count(), 0);
    }

    /// Active-side flow through the same handle space: open, transfer,
    /// flush, close.
    #[test]
    fn test_open_transfer_flush_close_flow() {
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport);

        // Drive the active side purely through the inbound port.
        let api: &mut dyn AdhocPtpApi = &mut service;
        let conn = api
            .open(&local_mac(), 0, &peer_mac(), 30000, 4096, 100_000, 3, 0)
            .unwrap();

        assert_eq!(api.send(conn, b"hello").unwrap(), 5);
        api.flush(conn).unwrap();
        api.close(conn).unwrap();

        assert_eq!(
            service.registry().get(conn).unwrap_err(),
            AdhocError::NotFound
        );
        assert_eq!(service.socket_count(), 0);
        assert_eq!(transport.open_count(), 0);
    }

    /// Error codes on the emulated ABI are negative; handles are not.
    #[test]
    fn test_error_codes_are_negative() {
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport);

        let err = service
            .listen(&MacAddr::zero(), 30000, 4096, 100_000, 5, 5, 0)
            .unwrap_err();
        assert_eq!(err, AdhocError::InvalidAddress);
        assert!(err.code() < 0);
    }
}
