use check_icmp::ping::{CorrelationEvent, Pinger};
use std::net::{IpAddr, Ipv4Addr};
use std::thread;

fn main() {
    // ICMPv4 ping to cloudflare's one.one.one.one (1.1.1.1)
    let dst_ip: IpAddr = IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1));
    let pinger: Pinger = Pinger::new(dst_ip);
    let mut rx = pinger.get_progress_receiver();
    // Run ping
    let handle = thread::spawn(move || pinger.ping());
    // Print progress until the pinger is dropped
    println!("Progress:");
    while let Ok(event) = rx.blocking_recv() {
        match event {
            CorrelationEvent::Sender { sequence, .. } => println!("{} sent", sequence),
            CorrelationEvent::Receiver(reply) => {
                println!("{} {} {:?} {}", reply.sequence, reply.source, reply.ttl, reply.size)
            }
        }
    }
    // Print final result
    println!("Result:");
    match handle.join().unwrap() {
        Ok(r) => {
            println!("Status: {:?}", r.status);
            for result in r.results {
                println!("{:?}", result);
            }
            println!("Statistics: {:?}", r.statistics);
            println!("Probe Time: {:?}", r.probe_time);
        }
        Err(e) => {
            print!("{}", e);
        }
    }
}
