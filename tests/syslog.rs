mod helpers;

use helpers::{data::*, harness::TestMachine};
use vmpager::common::{Pid, VirtAddr};
use vmpager::error::PagerError;

const P: Pid = Pid(3);

#[test]
fn dump_spans_resident_pages() {
    let tm = TestMachine::new(tight(2, 2));
    let pages = tm.spawn_with(P, 2).unwrap();
    let end_of_first = pages[0].offset(SMALL_PAGE - 2).unwrap();

    tm.write(P, end_of_first, &[0xde, 0xad, 0xbe, 0xef]).unwrap();

    assert_eq!(tm.syslog(P, end_of_first, 4).unwrap(), "deadbeef\n");
}

#[test]
fn dump_of_swapped_out_page_is_refused() {
    let tm = TestMachine::new(tight(1, 2));
    let pages = tm.spawn_with(P, 2).unwrap();
    tm.write(P, pages[0], b"zz").unwrap();
    tm.machine.load(P, pages[1]).unwrap();

    let err = tm.machine.syslog(P, pages[0], 2, &mut Vec::new()).unwrap_err();
    assert_eq!(err, PagerError::NotResident { pid: P, addr: pages[0] });

    // faulting it back in makes it readable again
    tm.machine.load(P, pages[0]).unwrap();
    assert_eq!(tm.syslog(P, pages[0], 2).unwrap(), "7a7a\n");
}

#[test]
fn dump_never_faults_anything_in() {
    let tm = TestMachine::new(tight(1, 1));
    let pages = tm.spawn_with(P, 1).unwrap();

    assert!(tm.syslog(P, pages[0], 1).is_err());
    assert_eq!(tm.stats().faults, 0);
    assert!(!tm.state(P, pages[0]).is_resident());
}

#[test]
fn dump_for_unknown_process_fails() {
    let tm = TestMachine::new(tight(1, 1));
    let err = tm
        .machine
        .syslog(Pid(99), VirtAddr(0), 1, &mut Vec::new())
        .unwrap_err();
    assert_eq!(err, PagerError::UnknownProcess { pid: Pid(99) });
}
