//! 最大网变换：为接口库所补全环境迁移并重写标号.
use crate::net::core::{Net, NetError};
use crate::net::ids::TransitionId;
use crate::net::structure::TimeInterval;

/// Gives the net a self-contained environment: every input place gains a
/// `[0,*]` producer `t<place>`, every output place a `[0,*]` consumer. The
/// firing rule can then ignore interface places entirely. Afterwards every
/// transition is relabeled: a read from the single interface place in its
/// preset becomes `<place>?`, a send to the single interface place in its
/// postset becomes `<place>!`, everything else becomes internal.
pub fn construct_maximal_net(net: &mut Net) -> Result<(), NetError> {
    for place in net.places.indices().collect::<Vec<_>>() {
        if net.places[place].input {
            let name = format!("t{}", net.places[place].name);
            let companion = net.create_transition(name, TimeInterval::default())?;
            net.connect_transition_to_place(companion, place, 1)?;
        } else if net.places[place].output {
            let name = format!("t{}", net.places[place].name);
            let companion = net.create_transition(name, TimeInterval::default())?;
            net.connect_place_to_transition(place, companion, 1)?;
        }
    }

    for transition in net.transitions.indices().collect::<Vec<_>>() {
        let label = transition_label(net, transition);
        net.transitions[transition].label = label;
    }
    Ok(())
}

fn transition_label(net: &Net, transition: TransitionId) -> String {
    let preset_io: Vec<_> = net
        .transition_preset(transition)
        .map(|(p, _)| p)
        .filter(|&p| net.places[p].is_interface())
        .collect();
    let postset_io: Vec<_> = net
        .transition_postset(transition)
        .map(|(p, _)| p)
        .filter(|&p| net.places[p].is_interface())
        .collect();

    if preset_io.len() == 1 && postset_io.is_empty() {
        return format!("{}?", net.places[preset_io[0]].name);
    }
    if postset_io.len() == 1 && preset_io.is_empty() {
        return format!("{}!", net.places[postset_io[0]].name);
    }
    String::new()
}
