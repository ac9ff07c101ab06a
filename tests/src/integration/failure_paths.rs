//! # Failure Mapping & Descriptor Accounting
//!
//! Verifies the invariant that no failing operation leaks a transport
//! descriptor, and that the error taxonomy maps transport failures the
//! way client code expects.

#[cfg(test)]
mod tests {
    use adhoc_ptp::{
        AdhocConfig, AdhocError, AdhocPtpService, FixedPortSource, MacAddr, NoOpAddressValidator,
        ScriptedTransport, TransportError,
    };

    fn local_mac() -> MacAddr {
        MacAddr::new([0x02, 0x10, 0x20, 0x30, 0x40, 0x50])
    }

    fn peer_mac() -> MacAddr {
        MacAddr::new([0x02, 0x60, 0x70, 0x80, 0x90, 0xa0])
    }

    fn build_service(transport: &ScriptedTransport, config: AdhocConfig) -> AdhocPtpService {
        let mut service = AdhocPtpService::new(
            Box::new(transport.clone()),
            Box::new(NoOpAddressValidator::new()),
            Box::new(FixedPortSource::new(vec![40000, 40001, 40002, 40003])),
            config,
        );
        service.init();
        service
    }

    /// Every scripted transport failure inside listen leaves the
    /// descriptor count balanced and the registry unchanged.
    #[test]
    fn test_listen_failure_paths_never_leak() {
        // Bind failure.
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport, AdhocConfig::default());
        transport.fail_bind_port(30000);
        assert_eq!(
            service
                .listen(&local_mac(), 30000, 4096, 100_000, 5, 5, 0)
                .unwrap_err(),
            AdhocError::SocketUnavailable
        );
        assert_eq!(transport.open_count(), 0);
        assert_eq!(transport.opened_total(), transport.closed_total());
        assert_eq!(service.socket_count(), 0);

        // Listen-mode failure.
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport, AdhocConfig::default());
        transport.fail_listen();
        assert_eq!(
            service
                .listen(&local_mac(), 30000, 4096, 100_000, 5, 5, 0)
                .unwrap_err(),
            AdhocError::SocketUnavailable
        );
        assert_eq!(transport.open_count(), 0);
        assert_eq!(transport.opened_total(), transport.closed_total());

        // Open failure: nothing to close.
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport, AdhocConfig::default());
        transport.fail_open();
        assert_eq!(
            service
                .listen(&local_mac(), 30000, 4096, 100_000, 5, 5, 0)
                .unwrap_err(),
            AdhocError::SocketUnavailable
        );
        assert_eq!(transport.opened_total(), 0);
        assert_eq!(transport.double_closes(), 0);
    }

    /// Registry capacity exhaustion closes the freshly opened descriptor.
    #[test]
    fn test_registry_capacity_never_leaks() {
        let transport = ScriptedTransport::new();
        let config = AdhocConfig::for_testing();
        let max = config.max_sockets;
        let mut service = build_service(&transport, config);

        for i in 0..max {
            service
                .listen(&local_mac(), 31000 + i as u16, 4096, 100_000, 5, 5, 0)
                .unwrap();
        }
        assert_eq!(
            service
                .listen(&local_mac(), 32000, 4096, 100_000, 5, 5, 0)
                .unwrap_err(),
            AdhocError::SocketUnavailable
        );
        assert_eq!(transport.open_count(), max);
        assert_eq!(transport.double_closes(), 0);
    }

    /// A saturated port source surfaces `PortSpaceExhausted` instead of
    /// spinning forever.
    #[test]
    fn test_port_space_exhaustion_is_bounded() {
        let transport = ScriptedTransport::new();
        let mut service = AdhocPtpService::new(
            Box::new(transport.clone()),
            Box::new(NoOpAddressValidator::new()),
            // Only ever draws one value, and it is taken.
            Box::new(FixedPortSource::new(vec![30000])),
            AdhocConfig::for_testing(),
        );
        service.init();

        service
            .listen(&local_mac(), 30000, 4096, 100_000, 5, 5, 0)
            .unwrap();
        assert_eq!(
            service
                .listen(&local_mac(), 0, 4096, 100_000, 5, 5, 0)
                .unwrap_err(),
            AdhocError::PortSpaceExhausted
        );
        assert_eq!(transport.opened_total(), 1);
    }

    /// Connect refusals close the attempt's descriptor.
    #[test]
    fn test_open_refused_never_leaks() {
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport, AdhocConfig::default());
        transport.push_connect(Err(TransportError::Refused));

        assert_eq!(
            service
                .open(&local_mac(), 0, &peer_mac(), 30000, 4096, 100_000, 5, 0)
                .unwrap_err(),
            AdhocError::ConnectionReset
        );
        assert_eq!(transport.open_count(), 0);
        assert_eq!(transport.opened_total(), transport.closed_total());
    }

    /// Shutdown with a mixed population closes everything exactly once.
    #[test]
    fn test_shutdown_balances_descriptors() {
        let transport = ScriptedTransport::new();
        let mut service = build_service(&transport, AdhocConfig::default());

        service
            .listen(&local_mac(), 30000, 4096, 100_000, 5, 5, 0)
            .unwrap();
        let listener = service
            .listen(&local_mac(), 30001, 4096, 100_000, 5, 5, 0)
            .unwrap();
        transport.push_accept(Ok((peer_mac(), 41000)));
        service.accept(listener).unwrap();
        service
            .open(&local_mac(), 0, &peer_mac(), 30002, 4096, 100_000, 5, 0)
            .unwrap();

        service.shutdown();
        assert_eq!(transport.open_count(), 0);
        assert_eq!(transport.opened_total(), transport.closed_total());
        assert_eq!(transport.double_closes(), 0);
    }
}
