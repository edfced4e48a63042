use simkernel::list::ListPool;

#[test]
fn intersection_of_two_ranges_preserves_order() {
    // `ListPool` keys a single shared membership table, so two lists whose
    // member sets overlap need two pools here (a real caller would use
    // disjoint `ProcessId`s drawn from one arena instead).
    let mut pool_a: ListPool<u32> = ListPool::new();
    let a = pool_a.new_list();
    for v in 0..10u32 {
        pool_a.add_last(a, v);
    }

    let mut pool_b: ListPool<u32> = ListPool::new();
    let b = pool_b.new_list();
    for v in 8..14u32 {
        pool_b.add_last(b, v);
    }

    let in_b: std::collections::HashSet<u32> = pool_b.iter(b).collect();
    let result: Vec<u32> = pool_a.iter(a).filter(|x| in_b.contains(x)).collect();

    assert_eq!(result, vec![8, 9]);
}

#[test]
fn cardinal_matches_iteration_count_after_removals() {
    let mut pool: ListPool<u32> = ListPool::new();
    let list = pool.new_list();
    for v in 0..20u32 {
        pool.add_last(list, v);
    }
    for v in (0..20u32).step_by(3) {
        pool.out(v);
    }
    let remaining: Vec<u32> = pool.iter(list).collect();
    assert_eq!(pool.cardinal(list), remaining.len());
    assert!(!remaining.contains(&0));
    assert!(remaining.contains(&1));
}
