//! # Loopback Transport Round-Trip
//!
//! Exercises the production TCP adapter end to end over 127.0.0.1: one
//! service instance carries both the passive and the active side, the
//! way a single emulated host tests against itself.

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddr};
    use std::thread;
    use std::time::Duration;

    use adhoc_ptp::{
        AdhocConfig, AdhocError, AdhocPtpService, LocalMacValidator, MacAddr, PtpState,
        RandomPortSource, SocketHandle, TcpStreamTransport,
    };

    const POLL_ATTEMPTS: usize = 200;
    const POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Opt-in log capture: `RUST_LOG=adhoc_ptp=debug cargo test -p adhoc-tests`.
    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn local_mac() -> MacAddr {
        MacAddr::new([0x02, 0x10, 0x20, 0x30, 0x40, 0x50])
    }

    fn loopback_peer_mac() -> MacAddr {
        MacAddr::new([0x02, 0x60, 0x70, 0x80, 0x90, 0xa0])
    }

    /// Re-invoke a readiness-dependent operation until it stops reporting
    /// would-block, per the subsystem's polling discipline.
    fn poll<T>(mut op: impl FnMut() -> Result<T, AdhocError>) -> Result<T, AdhocError> {
        for _ in 0..POLL_ATTEMPTS {
            match op() {
                Err(AdhocError::WouldBlock) => thread::sleep(POLL_INTERVAL),
                other => return other,
            }
        }
        Err(AdhocError::WouldBlock)
    }

    fn build_service() -> AdhocPtpService {
        let mut transport = TcpStreamTransport::new();
        // Both MACs resolve to loopback; the connect port selects the
        // actual listener.
        transport.register_peer(
            loopback_peer_mac(),
            SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
        );
        let mut service = AdhocPtpService::new(
            Box::new(transport),
            Box::new(LocalMacValidator::with_addrs(vec![
                local_mac(),
                loopback_peer_mac(),
            ])),
            Box::new(RandomPortSource::new()),
            AdhocConfig::default(),
        );
        service.init();
        service
    }

    /// Listen on the first free port from a candidate list; another
    /// process may hold any individual TCP port on this host.
    fn listen_on_free_port(service: &mut AdhocPtpService) -> (SocketHandle, u16) {
        for port in [42113u16, 42114, 42115, 42116, 42117] {
            match service.listen(&local_mac(), port, 4096, 100_000, 5, 5, 0) {
                Ok(handle) => return (handle, port),
                Err(AdhocError::SocketUnavailable) => continue,
                Err(err) => panic!("unexpected listen failure: {err}"),
            }
        }
        panic!("no free loopback port among candidates");
    }

    #[test]
    fn test_loopback_connect_accept_transfer() {
        init_logging();
        let mut service = build_service();
        let (listener, port) = listen_on_free_port(&mut service);
        assert_eq!(
            service.registry().get(listener).unwrap().state,
            PtpState::Listening
        );

        // Active open towards our own listener. A random auto-bound local
        // port can collide with the listener's; just redraw.
        let conn = (0..4)
            .find_map(|_| {
                match service.open(
                    &loopback_peer_mac(),
                    0,
                    &loopback_peer_mac(),
                    port,
                    4096,
                    100_000,
                    5,
                    0,
                ) {
                    Err(AdhocError::PortInUse(_)) => None,
                    other => Some(other),
                }
            })
            .expect("local port draws kept colliding")
            .expect("loopback connect");

        // The passive side surfaces the connection.
        let accepted = poll(|| service.accept(listener)).expect("loopback accept");
        let record = service.registry().get(accepted).unwrap();
        assert_eq!(record.state, PtpState::Established);
        assert_eq!(record.peer_addr, loopback_peer_mac());

        // Connector -> acceptor.
        let sent = poll(|| service.send(conn, b"ping over loopback")).unwrap();
        assert_eq!(sent, 18);
        poll(|| service.flush(conn)).unwrap();

        let mut buf = [0u8; 64];
        let mut received = Vec::new();
        while received.len() < 18 {
            let n = poll(|| service.recv(accepted, &mut buf)).expect("loopback recv");
            received.extend_from_slice(&buf[..n]);
        }
        assert_eq!(&received, b"ping over loopback");

        // Acceptor -> connector.
        poll(|| service.send(accepted, b"pong")).unwrap();
        let n = poll(|| service.recv(conn, &mut buf)).unwrap();
        assert_eq!(&buf[..n], b"pong");

        service.close(conn).unwrap();
        service.close(accepted).unwrap();
        service.close(listener).unwrap();
        assert_eq!(service.socket_count(), 0);
    }

    #[test]
    fn test_loopback_shutdown_releases_ports() {
        init_logging();
        let mut service = build_service();
        let (_listener, port) = listen_on_free_port(&mut service);
        service.shutdown();

        // The TCP port is free again for a fresh subsystem instance.
        let mut fresh = build_service();
        fresh
            .listen(&local_mac(), port, 4096, 100_000, 5, 5, 0)
            .expect("port released by shutdown");
        fresh.shutdown();
    }
}
