#[cfg(test)]
mod tests {
    use maplit::hashmap;

    use crate::{
        api::Machine,
        common::{Pid, VirtAddr},
        config::{PagerConfig, UVM_BASE_ADDR},
        error::PagerError,
        pager::PageState,
    };

    const P: Pid = Pid(1);
    const Q: Pid = Pid(2);

    fn small(frames: usize, blocks: usize) -> Machine {
        Machine::new(PagerConfig::new(frames, blocks).with_page_size(16)).unwrap()
    }

    #[test]
    fn load_of_fresh_page_reads_zero() {
        let m = small(2, 2);
        m.spawn(P).unwrap();
        let a = m.extend(P).unwrap();

        assert_eq!(m.load(P, a).unwrap(), 0);
        assert_eq!(m.stats().faults, 1);
        assert_eq!(m.stats().zero_fills, 1);
    }

    #[test]
    fn store_on_absent_page_takes_two_faults() {
        let m = small(2, 2);
        m.spawn(P).unwrap();
        let a = m.extend(P).unwrap();

        m.store(P, a, 9).unwrap();
        let stats = m.stats();
        assert_eq!(stats.faults, 2);
        assert_eq!(stats.write_upgrades, 1);

        // further stores to the same page are free
        m.store(P, a.offset(1).unwrap(), 10).unwrap();
        assert_eq!(m.stats().faults, 2);
        assert_eq!(m.read_bytes(P, a, 2).unwrap(), vec![9, 10]);
    }

    #[test]
    fn unextended_access_is_not_mapped() {
        let m = small(1, 1);
        m.spawn(P).unwrap();
        let a = VirtAddr(UVM_BASE_ADDR);

        assert_eq!(m.load(P, a), Err(PagerError::NotMapped { pid: P, addr: a }));
        assert_eq!(
            m.store(Q, a, 1),
            Err(PagerError::NotMapped { pid: Q, addr: a })
        );
        assert_eq!(m.stats().faults, 0);
    }

    #[test]
    fn content_survives_eviction_through_the_facade() {
        let m = small(1, 3);
        m.spawn(P).unwrap();
        let pages: Vec<_> = (0..3).map(|_| m.extend(P).unwrap()).collect();

        for (i, addr) in pages.iter().enumerate() {
            m.write_bytes(P, *addr, &[i as u8 + 1; 4]).unwrap();
        }
        for (i, addr) in pages.iter().enumerate() {
            assert_eq!(m.read_bytes(P, *addr, 4).unwrap(), vec![i as u8 + 1; 4]);
        }
        assert_eq!(m.pager().validate(), Ok(()));
    }

    #[test]
    fn processes_are_isolated() {
        let m = small(2, 4);
        m.spawn(P).unwrap();
        m.spawn(Q).unwrap();
        let p0 = m.extend(P).unwrap();
        let q0 = m.extend(Q).unwrap();
        assert_eq!(p0, q0);

        m.store(P, p0, 0xaa).unwrap();
        m.store(Q, q0, 0xbb).unwrap();

        let expected = hashmap! { P => 0xaa, Q => 0xbb };
        for (pid, byte) in expected {
            assert_eq!(m.load(pid, p0).unwrap(), byte);
        }
    }

    #[test]
    fn exit_drops_mappings_and_reused_pid_starts_clean() {
        let m = small(2, 2);
        m.spawn(P).unwrap();
        let a = m.extend(P).unwrap();
        m.store(P, a, 5).unwrap();

        m.exit(P).unwrap();
        assert_eq!(m.pager().with_controller(|mmu| mmu.mapped_pages(P)), 0);

        m.spawn(P).unwrap();
        assert_eq!(m.load(P, a), Err(PagerError::NotMapped { pid: P, addr: a }));

        let b = m.extend(P).unwrap();
        assert_eq!(b, a);
        assert_eq!(m.load(P, b).unwrap(), 0);
    }

    #[test]
    fn exit_unknown_process_fails() {
        let m = small(1, 1);
        assert_eq!(m.exit(P), Err(PagerError::UnknownProcess { pid: P }));
    }

    #[test]
    fn syslog_dumps_resident_bytes() {
        let m = small(1, 1);
        m.spawn(P).unwrap();
        let a = m.extend(P).unwrap();
        m.write_bytes(P, a, b"\x01\xfe").unwrap();

        let mut out = Vec::new();
        m.syslog(P, a, 2, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "01fe\n");
    }

    #[test]
    fn oversized_syslog_is_refused_without_poisoning_the_pager() {
        let m = small(1, 2);
        m.spawn(P).unwrap();
        let a = m.extend(P).unwrap();
        m.load(P, a).unwrap();

        let err = m.syslog(P, a, usize::MAX, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, PagerError::NotResident { pid: P, .. }));

        assert!(m.extend(P).is_ok());
        assert_eq!(m.load(P, a).unwrap(), 0);
    }

    #[test]
    fn overflowing_memory_size_is_an_error() {
        assert!(matches!(
            Machine::new(PagerConfig::new(usize::MAX, 1)),
            Err(PagerError::InvalidConfig { .. })
        ));
        assert!(matches!(
            Machine::new(PagerConfig::new(1, usize::MAX)),
            Err(PagerError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn clones_share_one_pager() {
        let m = small(1, 1);
        let other = m.clone();
        m.spawn(P).unwrap();
        let a = other.extend(P).unwrap();

        other.store(P, a, 3).unwrap();
        assert_eq!(m.load(P, a).unwrap(), 3);
        assert!(matches!(
            m.pager().with_core(|core| core.page_state(P, a)),
            Some(PageState::Resident { .. })
        ));
    }
}
